extern crate actix_web;
extern crate chrono;
extern crate dotenv;
extern crate env_logger;
extern crate itertools;
extern crate once_cell;
extern crate regex;
extern crate serde;
extern crate serde_json;
extern crate sha2;
extern crate sqlx;
extern crate thiserror;
extern crate tokio;

mod config;
mod context;
mod core;
mod database;
mod error;
mod handlers;
pub mod request;
pub mod response;

use actix_web::web::Data;
use actix_web::HttpServer;
use config::Config;
use database::sqlx::PgSqlxManager;
use sqlx::postgres::PgPoolOptions;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
    let config = Config::from_env().expect("invalid configuration");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    sqlx::migrate!().run(&pool).await.expect("failed to run migrations");
    let normalizer = crate::core::normalizer::Normalizer::new(config.label_prefix.clone());
    let bind = (config.bind_addr.clone(), config.port);
    log::info!("listening on {}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(normalizer.clone()))
            .app_data(Data::new(PgSqlxManager::new(pool.clone())))
            .app_data(handlers::json_config())
            .configure(handlers::routes::<PgSqlxManager>)
    })
    .bind(bind)?
    .run()
    .await
}
