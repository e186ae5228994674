use std::sync::Arc;

use crate::config::Config;
use crate::game::session::GameSessions;
use crate::store::GameStore;

/// Application state shared between workers
///
/// Built once at startup and handed to actix as `web::Data`.
pub struct AppState {
    pub games: GameSessions,
}

impl AppState {
    pub fn new(store: Arc<dyn GameStore>, config: &Config) -> Self {
        AppState {
            games: GameSessions::new(store, config),
        }
    }
}
