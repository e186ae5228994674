use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{debug, info};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use online_chess_api::{configure_routes, AppState, Config, GameStore, MemoryStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let store = Arc::new(MemoryStore::new());
    if config.seed_demo_players {
        for name in ["demo-white", "demo-black"] {
            let user_id = store
                .create_user(name, name)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            let token = store.issue_token(user_id);
            info!("Demo player {} (id {}) token: {}", name, user_id, token);
        }
    }

    // Create shared application state
    let app_state = web::Data::new(AppState::new(store, &config));
    spawn_idle_sweep(app_state.clone(), config.sweep_interval);

    info!(
        "Starting chess API server at http://{}:{}",
        config.host, config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(config.bind_address())?
    .run()
    .await
}

/// Periodically drop idle boards and expired session entries.
fn spawn_idle_sweep(state: web::Data<AppState>, every: Duration) {
    let every = every.max(Duration::from_secs(1));
    actix_rt::spawn(async move {
        let mut ticker = actix_rt::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = state.games.evict_expired();
            if evicted > 0 {
                debug!("Idle sweep evicted {} entries", evicted);
            }
        }
    });
}
