/// Middleware module
///
/// Authentication and cross-origin policy.

mod cors;
mod jwt_middleware;

pub use cors::build_cors;
pub use jwt_middleware::{authenticate, AuthenticatedUser, JwtMiddleware};
