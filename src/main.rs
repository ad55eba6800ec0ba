use std::str::FromStr;

use actix_web::{web, App, HttpServer};
use log::info;
use sqlx::{
    migrate,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::config::Config;

mod ac;
mod api;
mod auth;
mod config;
mod fallible;
mod guards;
mod models;
#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init();

    let config = Config::load().unwrap_or_else(|e| panic!("cannot load config: {}", e));

    info!("Connecting to the database");
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .unwrap_or_else(|e| panic!("invalid database url: {}", e))
        .create_if_missing(true);
    let db: SqlitePool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .unwrap_or_else(|e| panic!("Can't connect to database: {}", e));

    info!("Running database migrations...");
    migrate!("./migrations")
        .run(&db)
        .await
        .expect("couldn't run database migrations");

    models::User::ensure_default_admin(&db, &config.default_admin)
        .await
        .expect("couldn't seed the default admin account");

    info!("Starting http server on {}", config.listen);

    let listen = config.listen;
    HttpServer::new(move || {
        App::new()
            .data(db.clone())
            .data(config.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                fallible::Error::Validation(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|_, _| {
                fallible::Error::Validation("invalid id in path".to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                fallible::Error::Validation(err.to_string()).into()
            }))
            .service(api::auth::login)
            .service(api::auth::verify)
            .service(api::users::search)
            .service(api::users::statistics)
            .service(api::users::create)
            .service(api::users::list)
            .service(api::users::update)
            .service(api::users::suspend)
            // fixed segments first so `statistics` is never parsed as an id
            .service(api::patients::statistics)
            .service(api::patients::list_all)
            .service(api::patients::search)
            .service(api::patients::list)
            .service(api::patients::create)
            .service(api::patients::update)
            .service(api::patients::archive)
            .service(api::patients::restore)
            .service(api::patients::delete)
            .service(api::patients::history_add)
            .service(api::patients::history_list)
            .service(api::appointments::create)
            .service(api::appointments::list)
            .service(api::appointments::delete)
    })
    .bind(listen)?
    .run()
    .await
}
