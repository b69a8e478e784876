use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::TokenDenylist;
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::{build_cors, JwtMiddleware};
use crate::routes::{get_current_user, health_check, login, logout, register};
use crate::store::UserStore;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn UserStore>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let store: web::Data<dyn UserStore> = web::Data::from(store);
    let jwt_config = web::Data::new(settings.jwt.clone());
    let session = web::Data::new(settings.session);
    let hashing = web::Data::new(settings.hashing);
    let denylist = web::Data::new(TokenDenylist::new());
    let cors_settings = settings.cors.clone();

    tracing::info!(
        is_production = settings.session.is_production,
        "Session cookies configured"
    );

    let server = HttpServer::new(move || {
        let auth = JwtMiddleware::new(settings.jwt.clone(), denylist.clone());

        App::new()
            // Global middleware
            .wrap(LoggerMiddleware)
            .wrap(build_cors(&cors_settings))
            // Shared state
            .app_data(store.clone())
            .app_data(jwt_config.clone())
            .app_data(session.clone())
            .app_data(hashing.clone())
            .app_data(denylist.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
            }))
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    // Protected routes
                    .service(
                        web::resource("/me")
                            .route(web::get().to(get_current_user))
                            .wrap(auth.clone()),
                    )
                    .service(
                        web::resource("/logout")
                            .route(web::post().to(logout))
                            .wrap(auth),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
