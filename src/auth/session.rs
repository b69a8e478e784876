/// Session transport
///
/// Carries the token between client and server. Outbound it is written to
/// the `token` cookie; inbound it is read from that cookie or from an
/// `Authorization: Bearer` header.

use actix_web::cookie::time::{Duration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;

use crate::configuration::SessionSettings;

pub const SESSION_COOKIE_NAME: &str = "token";

const BEARER_PREFIX: &str = "Bearer ";

/// Cookie holding a freshly issued token. `max_age_seconds` should match the
/// token lifetime.
pub fn session_cookie(token: &str, settings: SessionSettings, max_age_seconds: i64) -> Cookie<'static> {
    let mut cookie = base_cookie(token.to_string(), settings);
    cookie.set_max_age(Duration::seconds(max_age_seconds));
    cookie
}

/// Cookie that makes the browser drop the session cookie.
pub fn removal_cookie(settings: SessionSettings) -> Cookie<'static> {
    let mut cookie = base_cookie(String::new(), settings);
    cookie.set_max_age(Duration::ZERO);
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    cookie
}

fn base_cookie(value: String, settings: SessionSettings) -> Cookie<'static> {
    let same_site = if settings.is_production {
        SameSite::None
    } else {
        SameSite::Lax
    };

    Cookie::build(SESSION_COOKIE_NAME, value)
        .path("/")
        .http_only(true)
        .secure(settings.is_production)
        .same_site(same_site)
        .finish()
}

/// Where a presented token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    Header,
}

/// Tokens found on an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentedTokens {
    pub cookie: Option<String>,
    pub header: Option<String>,
}

impl PresentedTokens {
    pub fn from_request(req: &HttpRequest) -> Self {
        let cookie = req
            .cookie(SESSION_COOKIE_NAME)
            .map(|c| c.value().trim().to_string())
            .filter(|v| !v.is_empty());

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_bearer);

        Self { cookie, header }
    }

    pub fn is_empty(&self) -> bool {
        self.cookie.is_none() && self.header.is_none()
    }

    /// Tokens in the order they are tried: cookie first, then header.
    pub fn in_precedence_order(&self) -> impl Iterator<Item = (TokenSource, &str)> {
        self.cookie
            .as_deref()
            .map(|t| (TokenSource::Cookie, t))
            .into_iter()
            .chain(self.header.as_deref().map(|t| (TokenSource::Header, t)))
    }
}

fn parse_bearer(value: &str) -> Option<String> {
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
