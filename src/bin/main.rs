use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use chirp::core::images::ImageStore;
use chirp::core::session::SessionAuthority;
use chirp::core::store::MemoryStore;
use chirp::{config, routes, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let secret = config::token_secret();
    if secret == config::DEV_TOKEN_SECRET {
        tracing::warn!("CHIRP_TOKEN_SECRET not set, using the dev secret");
    }
    let ttl = config::token_ttl_hours();
    match ttl {
        Some(hours) => tracing::info!(hours, "session tokens expire"),
        None => tracing::info!("session tokens do not expire"),
    }

    let store = Arc::new(MemoryStore::new());
    let state = web::Data::new(AppState {
        users: store.clone(),
        tweets: store,
        sessions: SessionAuthority::new(&secret, ttl),
        images: ImageStore::new(config::image_dir())?,
    });

    let port = config::port();
    tracing::info!(port, "listening");
    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .bind(("0.0.0.0", port))?
        .run()
        .await?;
    Ok(())
}
