pub mod auth;
pub mod response;

pub use auth::{authorize, AuthUser, ADMIN_ONLY, ANY_AUTHENTICATED, STAFF};
pub use response::{ApiResponse, ApiResult};
