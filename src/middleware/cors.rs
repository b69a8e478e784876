use actix_cors::Cors;
use actix_web::http::header;

use crate::configuration::CorsSettings;

/// Cross-origin policy for the browser frontend. Credentials are allowed so
/// the session cookie travels with cross-origin requests.
pub fn build_cors(settings: &CorsSettings) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .supports_credentials()
        .max_age(3600);

    for origin in &settings.allowed_origins {
        cors = cors.allowed_origin(origin);
    }
    tracing::debug!(origins = ?settings.allowed_origins, "CORS configured");

    cors
}
