use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub mod migrator;
pub mod repositories;

pub use repositories::activity::Activity;
pub use repositories::archive::ArchivedActivity;
pub use repositories::reset_request::{ResetRequest, ResetStatus};
pub use repositories::user::{NewUser, User, UserChanges};

/// Fixed administrator account created on first run if absent.
pub const BOOTSTRAP_ADMIN_EMAIL: &str = "atlas@studentmail.com";
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin22";
pub const BOOTSTRAP_ADMIN_PASSWORD: &str = "@Atlas22";
const BOOTSTRAP_ADMIN_PHONE: &str = "0000000000";

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    /// Opens the database, repairs the schema, and seeds the bootstrap admin.
    /// Only a connection failure is an error; schema and bootstrap problems
    /// are logged and the store proceeds so the app can still start.
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::ensure_schema(&conn).await;

        let store = Self { conn };
        store.ensure_bootstrap_admin().await;

        info!(
            "Database connected & schema verified (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(store)
    }

    async fn ensure_bootstrap_admin(&self) {
        let exists = match self.user_repo().find_by_email(BOOTSTRAP_ADMIN_EMAIL).await {
            Ok(user) => user.is_some(),
            Err(e) => {
                warn!("Could not check for bootstrap admin account: {e}");
                return;
            }
        };
        if exists {
            return;
        }

        let password_hash = match repositories::user::hash_password(BOOTSTRAP_ADMIN_PASSWORD, None)
        {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Could not hash bootstrap admin password: {e}");
                return;
            }
        };

        let admin = NewUser {
            email: BOOTSTRAP_ADMIN_EMAIL.to_string(),
            username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
            password_hash,
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            phone: BOOTSTRAP_ADMIN_PHONE.to_string(),
            is_admin: true,
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        match self.user_repo().insert(admin).await {
            Ok(_) => info!("Bootstrap admin account created"),
            Err(e) => warn!("Could not create bootstrap admin account: {e}"),
        }
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn reset_repo(&self) -> repositories::reset_request::ResetRequestRepository {
        repositories::reset_request::ResetRequestRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    fn archive_repo(&self) -> repositories::archive::ArchiveRepository {
        repositories::archive::ArchiveRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, DbErr> {
        self.user_repo().find_by_id(id).await
    }

    pub async fn find_user_by_username_and_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, DbErr> {
        self.user_repo()
            .find_by_username_and_email(username, email)
            .await
    }

    pub async fn user_email_exists(
        &self,
        email: &str,
        exclude: Option<i32>,
    ) -> Result<bool, DbErr> {
        self.user_repo().email_exists(email, exclude).await
    }

    pub async fn user_username_exists(
        &self,
        username: &str,
        exclude: Option<i32>,
    ) -> Result<bool, DbErr> {
        self.user_repo().username_exists(username, exclude).await
    }

    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbErr> {
        self.user_repo().insert(user).await
    }

    pub async fn update_user(&self, id: i32, changes: UserChanges) -> Result<u64, DbErr> {
        self.user_repo().update(id, changes).await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        password_hash: String,
    ) -> Result<u64, DbErr> {
        self.user_repo().update_password(id, password_hash).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<u64, DbErr> {
        self.user_repo().delete(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DbErr> {
        self.user_repo().list_all().await
    }

    pub async fn verify_login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<Option<User>, DbErr> {
        self.user_repo()
            .verify_login(username_or_email, password)
            .await
    }

    // ========== Password reset requests ==========

    pub async fn pending_reset_exists(&self, user_id: i32) -> Result<bool, DbErr> {
        self.reset_repo().pending_exists(user_id).await
    }

    pub async fn insert_pending_reset(
        &self,
        user_id: i32,
        username: String,
        email: String,
        requested_at: i64,
    ) -> Result<ResetRequest, DbErr> {
        self.reset_repo()
            .insert_pending(user_id, username, email, requested_at)
            .await
    }

    pub async fn find_reset_request(&self, id: i32) -> Result<Option<ResetRequest>, DbErr> {
        self.reset_repo().find_by_id(id).await
    }

    pub async fn list_pending_resets(&self) -> Result<Vec<ResetRequest>, DbErr> {
        self.reset_repo().list_pending().await
    }

    pub async fn find_approved_reset(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<ResetRequest>, DbErr> {
        self.reset_repo().find_approved(username, email).await
    }

    pub async fn approve_reset(
        &self,
        id: i32,
        approved_by: i32,
        approved_at: i64,
    ) -> Result<u64, DbErr> {
        self.reset_repo()
            .mark_approved(id, approved_by, approved_at)
            .await
    }

    pub async fn complete_reset(&self, id: i32, completed_at: i64) -> Result<u64, DbErr> {
        self.reset_repo().mark_completed(id, completed_at).await
    }

    pub async fn delete_resets_for_user(&self, user_id: i32) -> Result<u64, DbErr> {
        self.reset_repo().delete_for_user(user_id).await
    }

    // ========== Activities ==========

    pub async fn insert_activity(
        &self,
        user_id: i32,
        steps: i64,
        date: i64,
    ) -> Result<Activity, DbErr> {
        self.activity_repo().insert(user_id, steps, date).await
    }

    pub async fn list_activities_for_user(&self, user_id: i32) -> Result<Vec<Activity>, DbErr> {
        self.activity_repo().list_for_user(user_id).await
    }

    pub async fn update_activity_steps(
        &self,
        id: i32,
        steps: i64,
        owner: Option<i32>,
    ) -> Result<u64, DbErr> {
        self.activity_repo().update_steps(id, steps, owner).await
    }

    pub async fn set_activity_protected(
        &self,
        id: i32,
        protected: bool,
        owner: Option<i32>,
    ) -> Result<u64, DbErr> {
        self.activity_repo().set_protected(id, protected, owner).await
    }

    pub async fn delete_activity(&self, id: i32, owner: Option<i32>) -> Result<u64, DbErr> {
        self.activity_repo().delete(id, owner).await
    }

    pub async fn delete_all_activities_for_user(&self, user_id: i32) -> Result<u64, DbErr> {
        self.activity_repo().delete_all_for_user(user_id).await
    }

    pub async fn delete_unprotected_activities_for_user(
        &self,
        user_id: i32,
    ) -> Result<u64, DbErr> {
        self.activity_repo()
            .delete_unprotected_for_user(user_id)
            .await
    }

    // ========== Archived activities ==========

    pub async fn insert_archived_activity(
        &self,
        user_id: i32,
        steps: i64,
        date: i64,
        archived_at: i64,
    ) -> Result<ArchivedActivity, DbErr> {
        self.archive_repo()
            .insert(user_id, steps, date, archived_at)
            .await
    }

    pub async fn list_archived_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ArchivedActivity>, DbErr> {
        self.archive_repo().list_for_user(user_id).await
    }

    pub async fn delete_archived_activity(
        &self,
        id: i32,
        owner: Option<i32>,
    ) -> Result<u64, DbErr> {
        self.archive_repo().delete(id, owner).await
    }

    pub async fn delete_all_archived_for_user(&self, user_id: i32) -> Result<u64, DbErr> {
        self.archive_repo().delete_all_for_user(user_id).await
    }
}
