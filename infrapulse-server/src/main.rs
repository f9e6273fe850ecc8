#![deny(missing_docs)]
//! InfraPulse server executable.
//!
//! Hosts HTTP endpoints for client inventory, device sanity forms, and
//! weighted infrastructure scores.

mod config;
mod db;
mod models;
mod openapi;
mod routes;
mod schema;
mod store;

#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;
#[cfg(not(test))]
use infrapulse_core::MemoryInventoryStore;

#[cfg(not(test))]
use crate::config::{ServerConfig, StoreBackend};
#[cfg(not(test))]
use crate::db::init_pool;
#[cfg(not(test))]
use crate::routes::{AppState, SharedStore, configure_routes};
#[cfg(not(test))]
use crate::store::PgInventoryStore;

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;
    let store: SharedStore = match &config.store {
        StoreBackend::Postgres(url) => {
            let pool = init_pool(url).map_err(std::io::Error::other)?;
            Arc::new(PgInventoryStore::new(pool))
        }
        StoreBackend::Memory => {
            log::warn!("using in-memory inventory store; data is lost on restart");
            Arc::new(MemoryInventoryStore::new())
        }
    };
    let state = web::Data::new(AppState::new(store));

    let ServerConfig {
        host,
        port,
        allowed_origins,
        ..
    } = config;
    log::info!("listening on {host}:{port}");

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure_routes)
        })
        .bind((host, port))?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
