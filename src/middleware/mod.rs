pub mod admin_auth;
pub mod tracing;

pub use admin_auth::require_admin_token;
pub use self::tracing::observability_middleware;
