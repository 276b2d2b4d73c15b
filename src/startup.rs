use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::JwtSettings;
use crate::logger::RequestLogger;
use crate::routes::{
    create_post, delete_post, get_current_user, get_post, health_check, list_posts, login, logout,
    refresh, register, update_post,
};
use crate::store::CredentialStore;

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let credential_store = web::Data::new(CredentialStore::new(connection.clone()));
    let connection = web::Data::new(connection);
    let jwt_config = web::Data::new(jwt_config);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state: pool for the refresh registry and posts, the
            // credential store adapter, and the immutable signing settings
            .app_data(connection.clone())
            .app_data(credential_store.clone())
            .app_data(jwt_config.clone())
            .route("/health_check", web::get().to(health_check))
            // Public auth routes
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            .route("/auth/logout", web::post().to(logout))
            // Protected: handlers declare AuthenticatedUser and the gate
            // rejects unauthenticated calls with 401
            .route("/auth/me", web::get().to(get_current_user))
            // Posts: public reads, authenticated writes
            .service(
                web::resource("/posts")
                    .route(web::get().to(list_posts))
                    .route(web::post().to(create_post)),
            )
            .service(
                web::resource("/posts/{id}")
                    .route(web::get().to(get_post))
                    .route(web::put().to(update_post))
                    .route(web::delete().to(delete_post)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
