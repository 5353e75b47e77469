pub mod prelude;

pub mod activities;
pub mod archived_activities;
pub mod password_reset_requests;
pub mod users;
