//! Authentication module
//!
//! Bearer-token authentication for the roster API.

mod jwt;
mod middleware;
mod password;

pub use jwt::TokenService;
pub use middleware::auth_middleware;
pub use password::{hash_password, verify_password};
