//! In-memory session and authorization state.
//!
//! Holds the currently authenticated user. Written only by the auth service's
//! register/login/logout paths; read by every store operation to decide row
//! visibility and write permission. Passed explicitly into each service
//! instead of living in ambient global state.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub is_admin: bool,
    pub created_at: i64,
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    user: Option<SessionUser>,
    is_loading: bool,
}

#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    /// A fresh session starts unauthenticated and in the loading state until
    /// startup initialization finishes.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(SessionState {
                user: None,
                is_loading: true,
            }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_user(&self, user: SessionUser) {
        let mut state = self.write();
        state.user = Some(user);
        state.is_loading = false;
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.user = None;
        state.is_loading = false;
    }

    pub fn finish_loading(&self) {
        self.write().is_loading = false;
    }

    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        self.read().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.read().user.as_ref().is_some_and(|u| u.is_admin)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }
}
