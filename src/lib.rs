//! Turn-based two-player chess over HTTP.
//!
//! The live game-state engine: boards held in an idle-expiring cache, a
//! geometric legality checker, and the session logic that gates moves,
//! draw offers and resignations. Persistence and identity sit behind the
//! `GameStore` trait.

pub mod cache;
pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod routes;
pub mod store;

pub use cache::BoardCache;
pub use config::Config;
pub use error::GameError;
pub use game::{GameSessions, IllegalMove, MoveOutcome};
pub use models::{AppState, BoardState, Color, Move, Piece, PieceKind, Position};
pub use routes::configure_routes;
pub use store::{GameStore, MemoryStore};
