//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password;
use crate::db::{NewUser, ResetRequest, ResetStatus, Store, User, UserChanges};
use crate::services::auth_service::{
    AuthError, AuthService, LoginData, RegisterData, UpdateUserData,
};
use crate::services::session::Session;
use crate::services::validation;

pub struct SeaOrmAuthService {
    store: Store,
    session: Arc<Session>,
    security: SecurityConfig,
    users_cache: RwLock<Vec<User>>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, session: Arc<Session>, security: SecurityConfig) -> Self {
        Self {
            store,
            session,
            security,
            users_cache: RwLock::new(Vec::new()),
        }
    }

    /// Argon2 hashing is CPU-intensive; run it off the async runtime.
    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let security = self.security.clone();

        let hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))??;

        Ok(hash)
    }

    fn set_users_cache(&self, users: Vec<User>) {
        *self
            .users_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner) = users;
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, data: RegisterData) -> Result<User, AuthError> {
        if !validation::validate_email(&data.email) {
            return Err(AuthError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        if !validation::validate_username(&data.username) {
            return Err(AuthError::Validation(
                "Username must be 3-15 characters (letters and numbers only)".to_string(),
            ));
        }
        validation::validate_password(&data.password)
            .map_err(|msg| AuthError::Validation(msg.to_string()))?;
        if !validation::validate_phone(&data.phone) {
            return Err(AuthError::Validation(
                "Please enter a valid 10-digit phone number".to_string(),
            ));
        }
        if data.first_name.trim().is_empty() || data.last_name.trim().is_empty() {
            return Err(AuthError::Validation(
                "Please enter your first and last name".to_string(),
            ));
        }

        // Pre-checks give friendly messages; the uniqueness constraint at
        // insert time still backstops the race between check and insert.
        if self.store.user_email_exists(&data.email, None).await? {
            return Err(AuthError::Conflict(
                "This email is already registered".to_string(),
            ));
        }
        if self.store.user_username_exists(&data.username, None).await? {
            return Err(AuthError::Conflict(
                "This username is already taken".to_string(),
            ));
        }

        let password_hash = self.hash(&data.password).await?;

        let user = self
            .store
            .insert_user(NewUser {
                email: data.email,
                username: data.username,
                password_hash,
                first_name: data.first_name,
                last_name: data.last_name,
                phone: data.phone,
                is_admin: false,
                created_at: chrono::Utc::now().timestamp_millis(),
            })
            .await?;

        self.session.set_user(user.clone().into());
        Ok(user)
    }

    async fn login(&self, data: LoginData) -> Result<User, AuthError> {
        let user = self
            .store
            .verify_login(&data.username_or_email, &data.password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.session.set_user(user.clone().into());
        Ok(user)
    }

    fn logout(&self) {
        self.session.clear();
    }

    async fn update_user(&self, id: i32, data: UpdateUserData) -> Result<(), AuthError> {
        if data.is_empty() {
            return Err(AuthError::Validation(
                "No changes were provided".to_string(),
            ));
        }

        let mut changes = UserChanges::default();

        if let Some(username) = data.username {
            if !validation::validate_username(&username) {
                return Err(AuthError::Validation(
                    "Username must be 3-15 characters (letters and numbers only)".to_string(),
                ));
            }
            if self.store.user_username_exists(&username, Some(id)).await? {
                return Err(AuthError::Conflict(
                    "This username is already taken".to_string(),
                ));
            }
            changes.username = Some(username);
        }

        if let Some(email) = data.email {
            if !validation::validate_email(&email) {
                return Err(AuthError::Validation(
                    "Please enter a valid email address".to_string(),
                ));
            }
            if self.store.user_email_exists(&email, Some(id)).await? {
                return Err(AuthError::Conflict(
                    "This email is already registered".to_string(),
                ));
            }
            changes.email = Some(email);
        }

        if let Some(phone) = data.phone {
            if !validation::validate_phone(&phone) {
                return Err(AuthError::Validation(
                    "Please enter a valid 10-digit phone number".to_string(),
                ));
            }
            changes.phone = Some(phone);
        }

        if let Some(password) = data.password {
            validation::validate_password(&password)
                .map_err(|msg| AuthError::Validation(msg.to_string()))?;
            changes.password_hash = Some(self.hash(&password).await?);
        }

        let rows = self.store.update_user(id, changes).await?;
        if rows == 0 {
            return Err(AuthError::NotFound(format!("User {id} does not exist")));
        }

        // Keep the session in step with the persisted row.
        if self.session.user().is_some_and(|u| u.id == id) {
            if let Some(user) = self.store.find_user_by_id(id).await? {
                self.session.set_user(user.into());
            }
        }

        Ok(())
    }

    async fn delete_user(&self, id: i32) -> Result<(), AuthError> {
        // Cascade first, then the user row. Two sequential statements, not a
        // transaction.
        self.store.delete_resets_for_user(id).await?;

        let rows = self.store.delete_user(id).await?;
        if rows == 0 {
            return Err(AuthError::NotFound(format!("User {id} does not exist")));
        }

        if self.session.user().is_some_and(|u| u.id == id) {
            self.session.clear();
        }

        Ok(())
    }

    async fn get_all_users(&self) -> Result<Vec<User>, AuthError> {
        let users = self.store.list_users().await?;
        self.set_users_cache(users.clone());
        Ok(users)
    }

    async fn reset_user_password(&self, id: i32, new_password: &str) -> Result<(), AuthError> {
        validation::validate_password(new_password)
            .map_err(|msg| AuthError::Validation(msg.to_string()))?;

        let password_hash = self.hash(new_password).await?;
        let rows = self.store.update_user_password(id, password_hash).await?;
        if rows == 0 {
            return Err(AuthError::NotFound(format!("User {id} does not exist")));
        }

        Ok(())
    }

    async fn request_password_reset(&self, username: &str, email: &str) -> Result<(), AuthError> {
        let user = self
            .store
            .find_user_by_username_and_email(username, email)
            .await?
            .ok_or_else(|| {
                AuthError::NotFound("No account matches that username and email".to_string())
            })?;

        if self.store.pending_reset_exists(user.id).await? {
            return Err(AuthError::Conflict(
                "A reset request is already pending for this account".to_string(),
            ));
        }

        self.store
            .insert_pending_reset(
                user.id,
                user.username,
                user.email,
                chrono::Utc::now().timestamp_millis(),
            )
            .await?;

        Ok(())
    }

    async fn approve_password_reset(&self, request_id: i32) -> Result<(), AuthError> {
        let actor = self.session.user().ok_or(AuthError::Unauthorized)?;

        let request = self
            .store
            .find_reset_request(request_id)
            .await?
            .ok_or_else(|| {
                AuthError::NotFound(format!("Reset request {request_id} does not exist"))
            })?;

        if request.status != ResetStatus::Pending {
            return Err(AuthError::Validation(
                "Only pending requests can be approved".to_string(),
            ));
        }

        self.store
            .approve_reset(request_id, actor.id, chrono::Utc::now().timestamp_millis())
            .await?;

        Ok(())
    }

    async fn complete_password_reset(
        &self,
        username: &str,
        email: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validation::validate_password(new_password)
            .map_err(|msg| AuthError::Validation(msg.to_string()))?;

        let request = self
            .store
            .find_approved_reset(username, email)
            .await?
            .ok_or_else(|| {
                AuthError::NotFound(
                    "No approved reset request matches that username and email".to_string(),
                )
            })?;

        let password_hash = self.hash(new_password).await?;
        let rows = self
            .store
            .update_user_password(request.user_id, password_hash)
            .await?;
        if rows == 0 {
            return Err(AuthError::NotFound(format!(
                "User {} does not exist",
                request.user_id
            )));
        }

        self.store
            .complete_reset(request.id, chrono::Utc::now().timestamp_millis())
            .await?;

        Ok(())
    }

    async fn get_pending_reset_requests(&self) -> Result<Vec<ResetRequest>, AuthError> {
        Ok(self.store.list_pending_resets().await?)
    }

    fn users(&self) -> Vec<User> {
        self.users_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
