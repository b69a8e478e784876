/// Authentication Routes
///
/// Register, login, current user and logout. Register and login answer with
/// the user and a token, and also set the token as a cookie; clients may use
/// either the cookie or an `Authorization: Bearer` header afterwards.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    burn_verification_time, hash_password, issue_token, removal_cookie, session_cookie,
    validate_password_strength, verify_password, TokenDenylist,
};
use crate::configuration::{HashingSettings, JwtSettings, SessionSettings};
use crate::error::{AppError, AuthError, DatabaseError, ErrorContext, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::store::{NewUser, UserProfile, UserStore, DEFAULT_CURRENCY};
use crate::validators::{is_valid_currency, is_valid_email, is_valid_name};

/// POST /auth/register body. Fields are optional here so that absence is
/// reported as `MissingFields` instead of a deserialisation failure.
#[derive(Deserialize, Default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub currency: Option<String>,
}

/// POST /auth/login body
#[derive(Deserialize, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Registration input after boundary validation.
struct Registration {
    name: String,
    email: String,
    password: String,
    currency: String,
}

impl RegisterRequest {
    fn validate(self) -> Result<Registration, ValidationError> {
        let name = present(self.name);
        let email = present(self.email);
        let password = self.password.filter(|p| !p.is_empty());

        let (name, email, password) = match (name, email, password) {
            (Some(name), Some(email), Some(password)) => (name, email, password),
            (name, email, password) => {
                let mut missing = Vec::new();
                if name.is_none() {
                    missing.push("name");
                }
                if email.is_none() {
                    missing.push("email");
                }
                if password.is_none() {
                    missing.push("password");
                }
                return Err(ValidationError::MissingFields(missing));
            }
        };

        let currency = match present(self.currency) {
            Some(currency) => is_valid_currency(&currency)?,
            None => DEFAULT_CURRENCY.to_string(),
        };
        validate_password_strength(&password)?;

        Ok(Registration {
            name: is_valid_name(&name)?,
            email: is_valid_email(&email)?,
            password,
            currency,
        })
    }
}

impl LoginRequest {
    fn validate(self) -> Result<(String, String), ValidationError> {
        match (present(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok((email, password)),
            (email, password) => {
                let mut missing = Vec::new();
                if email.is_none() {
                    missing.push("email");
                }
                if password.is_none() {
                    missing.push("password");
                }
                Err(ValidationError::MissingFields(missing))
            }
        }
    }
}

/// Treat empty and whitespace-only strings like missing fields.
fn present(field: Option<String>) -> Option<String> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /auth/register
///
/// # Errors
/// - 400 `MISSING_FIELDS`: name, email or password absent
/// - 400 `VALIDATION_ERROR`: malformed email, currency or password length
/// - 400 `DUPLICATE_EMAIL`: email already registered
/// - 500: internal failure
pub async fn register(
    body: web::Json<RegisterRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
    session: web::Data<SessionSettings>,
    hashing: web::Data<HashingSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");
    let registration = body.into_inner().validate()?;

    let cost = hashing.cost;
    let password = registration.password;
    let password_hash = web::block(move || hash_password(&password, cost)).await??;

    // Uniqueness is decided by the store; there is no separate lookup first.
    let user = store
        .create(NewUser {
            name: registration.name,
            email: registration.email,
            password_hash,
            currency: registration.currency,
        })
        .await?;

    let token = issue_token(&user.id, jwt_config.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created()
        .cookie(session_cookie(&token, **session, jwt_config.token_expiry))
        .json(AuthResponse {
            user: user.into(),
            token,
        }))
}

/// POST /auth/login
///
/// Unknown email and wrong password produce the same response, so the
/// endpoint cannot be used to probe which emails are registered.
///
/// # Errors
/// - 400 `MISSING_FIELDS`: email or password absent
/// - 400 `INVALID_CREDENTIALS`: unknown email or wrong password
/// - 500: internal failure
pub async fn login(
    body: web::Json<LoginRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
    session: web::Data<SessionSettings>,
    hashing: web::Data<HashingSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let (email, password) = body.into_inner().validate()?;

    let user = match store.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            let cost = hashing.cost;
            web::block(move || burn_verification_time(&password, cost)).await?;
            tracing::info!(request_id = %context.request_id, "Login for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let password_hash = user.password_hash.clone();
    let password_valid = web::block(move || verify_password(&password, &password_hash)).await??;
    if !password_valid {
        tracing::info!(
            request_id = %context.request_id,
            user_id = %user.id,
            "Login with wrong password"
        );
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = issue_token(&user.id, jwt_config.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&token, **session, jwt_config.token_expiry))
        .json(AuthResponse {
            user: user.into(),
            token,
        }))
}

/// GET /auth/me
///
/// # Errors
/// - 401: missing, invalid, expired or revoked token (middleware)
/// - 404: the account was removed after the token was issued
pub async fn get_current_user(
    identity: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user_id = identity.user_id;

    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user_id)))?;

    Ok(HttpResponse::Ok().json(UserResponse { user }))
}

/// POST /auth/logout
///
/// Clears the session cookie and denies the presented token for the rest of
/// its lifetime.
pub async fn logout(
    identity: web::ReqData<AuthenticatedUser>,
    denylist: web::Data<TokenDenylist>,
    session: web::Data<SessionSettings>,
) -> HttpResponse {
    let identity = identity.into_inner();
    denylist.revoke(identity.token_id, identity.expires_at);

    let context = ErrorContext::new("user_logout").with_user_id(identity.user_id.to_string());
    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        "User logged out"
    );

    HttpResponse::Ok()
        .cookie(removal_cookie(**session))
        .json(MessageResponse {
            message: "Logged out successfully".to_string(),
        })
}
