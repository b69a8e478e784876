/// Authentication middleware
///
/// Extracts the session token (cookie first, then `Authorization: Bearer`),
/// verifies it and inserts an `AuthenticatedUser` into request extensions.
/// Handlers read it with `web::ReqData<AuthenticatedUser>`. The middleware
/// never reads the user store.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::{verify_token, PresentedTokens, TokenDenylist, TokenSource};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Identity resolved from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub token_id: Uuid,
    /// Unix timestamp
    pub expires_at: i64,
}

/// Resolve the request identity from the presented tokens.
///
/// Tokens are tried in precedence order; a cookie token that fails does not
/// shadow a valid header token. When every token fails, the error of the
/// first one is returned.
pub fn authenticate(
    tokens: &PresentedTokens,
    jwt_config: &JwtSettings,
    denylist: &TokenDenylist,
) -> Result<(AuthenticatedUser, TokenSource), AuthError> {
    let mut first_error = None;

    for (source, token) in tokens.in_precedence_order() {
        match verify_one(token, jwt_config, denylist) {
            Ok(user) => return Ok((user, source)),
            Err(e) => {
                tracing::debug!(source = ?source, error = %e, "Presented token rejected");
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.unwrap_or(AuthError::MissingToken))
}

fn verify_one(
    token: &str,
    jwt_config: &JwtSettings,
    denylist: &TokenDenylist,
) -> Result<AuthenticatedUser, AuthError> {
    let claims = verify_token(token, jwt_config)?;
    let token_id = claims.token_id()?;
    if denylist.is_revoked(&token_id) {
        return Err(AuthError::TokenRevoked);
    }

    Ok(AuthenticatedUser {
        user_id: claims.user_id()?,
        token_id,
        expires_at: claims.exp,
    })
}

/// Middleware for routes that require an authenticated user
#[derive(Clone)]
pub struct JwtMiddleware {
    jwt_config: JwtSettings,
    denylist: web::Data<TokenDenylist>,
}

impl JwtMiddleware {
    pub fn new(jwt_config: JwtSettings, denylist: web::Data<TokenDenylist>) -> Self {
        Self { jwt_config, denylist }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
            denylist: self.denylist.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
    denylist: web::Data<TokenDenylist>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let tokens = PresentedTokens::from_request(req.request());

        match authenticate(&tokens, &self.jwt_config, &self.denylist) {
            Ok((user, source)) => {
                tracing::debug!(
                    user_id = %user.user_id,
                    source = ?source,
                    "Token verified"
                );
                req.extensions_mut().insert(user);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Request not authenticated");
                Box::pin(async move { Err(AppError::Auth(e).into()) })
            }
        }
    }
}
