//! Authentication: password hashing, signed tokens, the auth service and the
//! actix-web pieces that put a verified caller into each request.

pub mod errors;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

pub use errors::AuthError;
pub use extractors::{AdminUser, AuthenticatedUser};
pub use middleware::AuthMiddleware;
pub use password::{PasswordError, PasswordHasher};
pub use service::AuthService;
pub use token::{AccessClaims, Claims, RefreshClaims, TokenError, TokenIssuer, TokenPair};
