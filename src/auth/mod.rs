/// Authentication module
///
/// Token issuing/verification, password hashing, cookie/header session
/// transport and logout revocation.

mod claims;
mod jwt;
mod password;
mod revocation;
mod session;

pub use claims::Claims;
pub use jwt::{issue_token, verify_token};
pub use password::{burn_verification_time, hash_password, validate_password_strength, verify_password};
pub use revocation::TokenDenylist;
pub use session::{removal_cookie, session_cookie, PresentedTokens, TokenSource, SESSION_COOKIE_NAME};
