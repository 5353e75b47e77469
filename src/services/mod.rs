pub mod session;
pub use session::{Session, SessionUser};

pub mod validation;

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, LoginData, RegisterData, UpdateUserData};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod activity_service;
pub use activity_service::{ActivityError, ActivityService};

pub mod activity_service_impl;
pub use activity_service_impl::SeaOrmActivityService;

pub mod archive_service;
pub use archive_service::{ArchiveError, ArchiveService};

pub mod archive_service_impl;
pub use archive_service_impl::SeaOrmArchiveService;

pub mod stats;
pub use stats::{ActivitySummary, DistributionBucket};
