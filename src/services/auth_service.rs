//! Domain service for authentication and user management.
//!
//! Handles registration, login, session state, profile updates, admin user
//! management, and the password-reset workflow.

use thiserror::Error;

use crate::db::{ResetRequest, User};

/// Errors specific to authentication and user-management operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Deliberately generic: does not reveal whether the account exists or
    /// the password was wrong.
    #[error("Invalid username/email or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not signed in")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        // A uniqueness race between pre-check and insert surfaces here.
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            if msg.contains("email") {
                return Self::Conflict("This email is already registered".to_string());
            }
            if msg.contains("username") {
                return Self::Conflict("This username is already taken".to_string());
            }
            return Self::Conflict(msg);
        }
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RegisterData {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct LoginData {
    pub username_or_email: String,
    pub password: String,
}

/// Sparse profile update; only the provided fields are validated and applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserData {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UpdateUserData {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }
}

/// Domain service trait for authentication and user management.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Validates the input, creates the account, and signs the new user in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for any format or policy failure and
    /// [`AuthError::Conflict`] when the email or username is already taken —
    /// whether caught by the pre-check or by the uniqueness constraint at
    /// insert time.
    async fn register(&self, data: RegisterData) -> Result<User, AuthError>;

    /// Matches the email OR username, verifies the password, and signs in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on any mismatch.
    async fn login(&self, data: LoginData) -> Result<User, AuthError>;

    /// Clears session state. No store interaction.
    fn logout(&self);

    /// Applies the provided fields to the user, re-validating each one. When
    /// the updated id is the signed-in user, session state is refreshed.
    async fn update_user(&self, id: i32, data: UpdateUserData) -> Result<(), AuthError>;

    /// Deletes the account and its password-reset requests. Deleting the
    /// signed-in user also signs them out.
    async fn delete_user(&self, id: i32) -> Result<(), AuthError>;

    /// All users, newest account first. Refreshes the in-memory user list.
    async fn get_all_users(&self) -> Result<Vec<User>, AuthError>;

    /// Overwrites a user's password unconditionally (admin-initiated reset;
    /// the old password is not required).
    async fn reset_user_password(&self, id: i32, new_password: &str) -> Result<(), AuthError>;

    /// Files a pending reset request for the account matching this
    /// username+email pair. At most one pending request per user.
    async fn request_password_reset(&self, username: &str, email: &str) -> Result<(), AuthError>;

    /// Moves a pending request to approved, stamped with the acting user.
    async fn approve_password_reset(&self, request_id: i32) -> Result<(), AuthError>;

    /// Finds the approved request matching username+email, sets the new
    /// password, and marks the request completed.
    async fn complete_password_reset(
        &self,
        username: &str,
        email: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// All pending requests, newest first.
    async fn get_pending_reset_requests(&self) -> Result<Vec<ResetRequest>, AuthError>;

    /// Snapshot of the user list as of the last `get_all_users` call.
    fn users(&self) -> Vec<User>;
}
