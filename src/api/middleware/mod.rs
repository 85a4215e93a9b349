//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{auth_middleware, require_admin, verify_token, Claims, CurrentUser};
pub use rate_limit::{rate_limit_middleware, rate_limit_write_middleware};
