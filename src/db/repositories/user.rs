use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;

/// User data returned from the repository (without the password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub is_admin: bool,
    pub created_at: i64,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            is_admin: model.is_admin,
            created_at: model.created_at,
        }
    }
}

/// Input for a fresh user row. The password is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub is_admin: bool,
    pub created_at: i64,
}

/// Sparse profile update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.password_hash.is_none()
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, DbErr> {
        let user = users::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(user.map(User::from))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbErr> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?;
        Ok(user.map(User::from))
    }

    /// Exact username+email pair match, used by the password-reset flow to
    /// re-identify an account without a password.
    pub async fn find_by_username_and_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, DbErr> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?;
        Ok(user.map(User::from))
    }

    pub async fn email_exists(&self, email: &str, exclude: Option<i32>) -> Result<bool, DbErr> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = exclude {
            query = query.filter(users::Column::Id.ne(id));
        }
        Ok(query.count(&self.conn).await? > 0)
    }

    pub async fn username_exists(
        &self,
        username: &str,
        exclude: Option<i32>,
    ) -> Result<bool, DbErr> {
        let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
        if let Some(id) = exclude {
            query = query.filter(users::Column::Id.ne(id));
        }
        Ok(query.count(&self.conn).await? > 0)
    }

    pub async fn insert(&self, user: NewUser) -> Result<User, DbErr> {
        let active = users::ActiveModel {
            email: Set(user.email),
            username: Set(user.username),
            password_hash: Set(user.password_hash),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            phone: Set(user.phone),
            is_admin: Set(user.is_admin),
            created_at: Set(user.created_at),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(model.into())
    }

    /// Applies only the provided fields. Returns the number of rows touched
    /// (0 when the id does not exist).
    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, DbErr> {
        let Some(model) = users::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(0);
        };

        let mut active: users::ActiveModel = model.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(hash) = changes.password_hash {
            active.password_hash = Set(hash);
        }
        active.update(&self.conn).await?;

        Ok(1)
    }

    pub async fn update_password(&self, id: i32, password_hash: String) -> Result<u64, DbErr> {
        let Some(model) = users::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(0);
        };

        let mut active: users::ActiveModel = model.into();
        active.password_hash = Set(password_hash);
        active.update(&self.conn).await?;

        Ok(1)
    }

    pub async fn delete(&self, id: i32) -> Result<u64, DbErr> {
        let result = users::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected)
    }

    /// All users, newest account first.
    pub async fn list_all(&self) -> Result<Vec<User>, DbErr> {
        let rows = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Looks up a user by email or username and verifies the password against
    /// the stored Argon2 hash. Returns `None` for both a missing account and a
    /// wrong password so callers cannot distinguish the two.
    ///
    /// Verification runs under `spawn_blocking` because Argon2 is
    /// CPU-intensive and would stall the async runtime if run inline.
    pub async fn verify_login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<Option<User>, DbErr> {
        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Email.eq(username_or_email))
                    .add(users::Column::Username.eq(username_or_email)),
            )
            .one(&self.conn)
            .await?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            PasswordHash::new(&password_hash).is_ok_and(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
        })
        .await
        .map_err(|e| DbErr::Custom(format!("Password verification task panicked: {e}")))?;

        Ok(is_valid.then(|| User::from(user)))
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
