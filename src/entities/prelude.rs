pub use super::activities::Entity as Activities;
pub use super::archived_activities::Entity as ArchivedActivities;
pub use super::password_reset_requests::Entity as PasswordResetRequests;
pub use super::users::Entity as Users;
