//! Integration tests for registration, login, profile management, and the
//! password-reset workflow.

use std::sync::Arc;

use atlas::config::SecurityConfig;
use atlas::db::{BOOTSTRAP_ADMIN_PASSWORD, BOOTSTRAP_ADMIN_USERNAME, Store};
use atlas::services::{
    AuthError, AuthService, LoginData, RegisterData, SeaOrmAuthService, Session, UpdateUserData,
};

async fn test_store() -> Store {
    let db_path = std::env::temp_dir().join(format!("atlas-auth-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open test store")
}

/// Low-cost Argon2 params so tests stay fast.
fn test_security() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}

fn auth_for(store: &Store) -> (Arc<Session>, SeaOrmAuthService) {
    let session = Session::new();
    session.finish_loading();
    let auth = SeaOrmAuthService::new(store.clone(), session.clone(), test_security());
    (session, auth)
}

fn register_data(email: &str, username: &str) -> RegisterData {
    RegisterData {
        email: email.to_string(),
        username: username.to_string(),
        password: "x9t#m4q".to_string(),
        first_name: "Mia".to_string(),
        last_name: "Chen".to_string(),
        phone: "5551234567".to_string(),
    }
}

fn login_data(username_or_email: &str, password: &str) -> LoginData {
    LoginData {
        username_or_email: username_or_email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn bootstrap_admin_can_sign_in() {
    let store = test_store().await;
    let (session, auth) = auth_for(&store);

    let admin = auth
        .login(login_data(BOOTSTRAP_ADMIN_USERNAME, BOOTSTRAP_ADMIN_PASSWORD))
        .await
        .expect("bootstrap admin login failed");

    assert!(admin.is_admin);
    assert!(session.is_authenticated());
    assert!(session.is_admin());
}

#[tokio::test]
async fn register_signs_in_and_persists() {
    let store = test_store().await;
    let (session, auth) = auth_for(&store);

    assert!(!session.is_authenticated());

    let user = auth
        .register(register_data("mia@example.com", "miachen"))
        .await
        .expect("registration failed");

    assert!(!user.is_admin);
    assert_eq!(session.user().map(|u| u.id), Some(user.id));

    auth.logout();
    assert!(!session.is_authenticated());

    // Login works by username and by email.
    auth.login(login_data("miachen", "x9t#m4q"))
        .await
        .expect("login by username failed");
    auth.logout();
    auth.login(login_data("mia@example.com", "x9t#m4q"))
        .await
        .expect("login by email failed");
}

#[tokio::test]
async fn register_rejects_invalid_usernames() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    let too_short = auth
        .register(register_data("a@example.com", "ab"))
        .await;
    assert!(matches!(too_short, Err(AuthError::Validation(_))));

    let underscore = auth
        .register(register_data("b@example.com", "valid_123"))
        .await;
    assert!(matches!(underscore, Err(AuthError::Validation(_))));

    auth.register(register_data("c@example.com", "validUser1"))
        .await
        .expect("valid username rejected");
}

#[tokio::test]
async fn register_rejects_policy_breaking_passwords() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    let mut data = register_data("mia@example.com", "miachen");
    data.password = "abc123!".to_string();

    let result = auth.register(data).await;
    assert!(matches!(result, Err(AuthError::Validation(_))));
}

#[tokio::test]
async fn duplicate_email_conflicts_regardless_of_username() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    auth.register(register_data("shared@example.com", "firstuser"))
        .await
        .expect("first registration failed");

    let second = auth
        .register(register_data("shared@example.com", "seconduser"))
        .await;
    assert!(matches!(second, Err(AuthError::Conflict(_))));
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    auth.register(register_data("one@example.com", "taken1"))
        .await
        .expect("first registration failed");

    let second = auth.register(register_data("two@example.com", "taken1")).await;
    assert!(matches!(second, Err(AuthError::Conflict(_))));
}

#[tokio::test]
async fn login_failure_is_generic() {
    let store = test_store().await;
    let (session, auth) = auth_for(&store);

    auth.register(register_data("mia@example.com", "miachen"))
        .await
        .expect("registration failed");
    auth.logout();

    // Wrong password and missing account fail identically.
    let wrong_password = auth.login(login_data("miachen", "n5w@f8z")).await;
    assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));

    let missing_user = auth.login(login_data("nobody", "n5w@f8z")).await;
    assert!(matches!(missing_user, Err(AuthError::InvalidCredentials)));

    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn update_user_requires_changes() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    let user = auth
        .register(register_data("mia@example.com", "miachen"))
        .await
        .expect("registration failed");

    let result = auth.update_user(user.id, UpdateUserData::default()).await;
    assert!(matches!(result, Err(AuthError::Validation(_))));
}

#[tokio::test]
async fn update_user_checks_uniqueness_against_others_only() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    auth.register(register_data("first@example.com", "firstuser"))
        .await
        .expect("first registration failed");
    let second = auth
        .register(register_data("second@example.com", "seconduser"))
        .await
        .expect("second registration failed");

    // Taking another user's name conflicts.
    let taken = auth
        .update_user(
            second.id,
            UpdateUserData {
                username: Some("firstuser".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(taken, Err(AuthError::Conflict(_))));

    // Re-submitting your own current name does not.
    auth.update_user(
        second.id,
        UpdateUserData {
            username: Some("seconduser".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("no-op username update failed");
}

#[tokio::test]
async fn updating_session_user_refreshes_session() {
    let store = test_store().await;
    let (session, auth) = auth_for(&store);

    let user = auth
        .register(register_data("mia@example.com", "miachen"))
        .await
        .expect("registration failed");

    auth.update_user(
        user.id,
        UpdateUserData {
            username: Some("miarenamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("update failed");

    assert_eq!(
        session.user().map(|u| u.username),
        Some("miarenamed".to_string())
    );
}

#[tokio::test]
async fn deleting_own_account_signs_out() {
    let store = test_store().await;
    let (session, auth) = auth_for(&store);

    let user = auth
        .register(register_data("mia@example.com", "miachen"))
        .await
        .expect("registration failed");

    auth.delete_user(user.id).await.expect("delete failed");
    assert!(!session.is_authenticated());

    let gone = auth.login(login_data("miachen", "x9t#m4q")).await;
    assert!(matches!(gone, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn delete_user_cascades_reset_requests() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    let user = auth
        .register(register_data("mia@example.com", "miachen"))
        .await
        .expect("registration failed");
    auth.logout();

    auth.request_password_reset("miachen", "mia@example.com")
        .await
        .expect("reset request failed");
    assert_eq!(auth.get_pending_reset_requests().await.unwrap().len(), 1);

    auth.delete_user(user.id).await.expect("delete failed");

    assert!(auth.get_pending_reset_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_reset_overwrites_without_old_password() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    let user = auth
        .register(register_data("mia@example.com", "miachen"))
        .await
        .expect("registration failed");
    auth.logout();

    auth.reset_user_password(user.id, "n5w@f8z")
        .await
        .expect("admin reset failed");

    auth.login(login_data("miachen", "n5w@f8z"))
        .await
        .expect("login with reset password failed");
}

#[tokio::test]
async fn reset_workflow_pending_to_approved_to_completed() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    auth.register(register_data("mia@example.com", "miachen"))
        .await
        .expect("registration failed");
    auth.logout();

    // Unknown account cannot file a request.
    let unknown = auth
        .request_password_reset("nobody", "nobody@example.com")
        .await;
    assert!(matches!(unknown, Err(AuthError::NotFound(_))));

    auth.request_password_reset("miachen", "mia@example.com")
        .await
        .expect("reset request failed");

    // Only one pending request per user.
    let duplicate = auth
        .request_password_reset("miachen", "mia@example.com")
        .await;
    assert!(matches!(duplicate, Err(AuthError::Conflict(_))));

    let request_id = auth.get_pending_reset_requests().await.unwrap()[0].id;

    // Approval needs a signed-in actor.
    let anonymous = auth.approve_password_reset(request_id).await;
    assert!(matches!(anonymous, Err(AuthError::Unauthorized)));

    // Completion before approval finds nothing.
    let premature = auth
        .complete_password_reset("miachen", "mia@example.com", "n5w@f8z")
        .await;
    assert!(matches!(premature, Err(AuthError::NotFound(_))));

    auth.login(login_data(BOOTSTRAP_ADMIN_USERNAME, BOOTSTRAP_ADMIN_PASSWORD))
        .await
        .expect("admin login failed");
    auth.approve_password_reset(request_id)
        .await
        .expect("approval failed");

    // Approving twice is rejected: the request is no longer pending.
    let again = auth.approve_password_reset(request_id).await;
    assert!(matches!(again, Err(AuthError::Validation(_))));

    auth.logout();

    // The wrong identity pair cannot complete the reset.
    let wrong_pair = auth
        .complete_password_reset("miachen", "other@example.com", "n5w@f8z")
        .await;
    assert!(matches!(wrong_pair, Err(AuthError::NotFound(_))));

    auth.complete_password_reset("miachen", "mia@example.com", "n5w@f8z")
        .await
        .expect("completion failed");

    // New password works, old one does not.
    auth.login(login_data("miachen", "n5w@f8z"))
        .await
        .expect("login with new password failed");
    auth.logout();
    let old = auth.login(login_data("miachen", "x9t#m4q")).await;
    assert!(matches!(old, Err(AuthError::InvalidCredentials)));

    assert!(auth.get_pending_reset_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_all_users_orders_newest_first_and_fills_cache() {
    let store = test_store().await;
    let (_, auth) = auth_for(&store);

    auth.register(register_data("first@example.com", "firstuser"))
        .await
        .expect("first registration failed");
    auth.register(register_data("second@example.com", "seconduser"))
        .await
        .expect("second registration failed");

    let users = auth.get_all_users().await.expect("listing failed");

    // Two registrations plus the bootstrap admin.
    assert_eq!(users.len(), 3);
    assert_eq!(users[0].username, "seconduser");
    assert_eq!(auth.users().len(), 3);
}

#[tokio::test]
async fn session_starts_loading_until_initialized() {
    let session = Session::new();
    assert!(session.is_loading());
    assert!(!session.is_authenticated());

    session.finish_loading();
    assert!(!session.is_loading());
}
