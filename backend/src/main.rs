mod config;
mod db;
mod error;
mod identity;
mod services;

use crate::config::Config;
use crate::db::Database;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let database = Database::new(&config.storage.path);
    database.initialize().map_err(io::Error::other)?;
    if let Some(admin) = &config.bootstrap_admin {
        database
            .ensure_admin(&admin.id, &admin.name)
            .map_err(io::Error::other)?;
    }

    let url = config.url();
    let json_limit = config.server.json_limit;
    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(database.clone()))
            .configure(|cfg| services::configure(cfg, json_limit))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
