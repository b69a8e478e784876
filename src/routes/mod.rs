mod auth;
mod health_check;

pub use auth::{get_current_user, login, logout, register};
pub use auth::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UserResponse};
pub use health_check::health_check;
