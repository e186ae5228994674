pub mod app_state;
pub mod game_state;
pub mod messages;
pub mod piece;

// Re-export important types
pub use app_state::AppState;
pub use game_state::BoardState;
pub use messages::*;
pub use piece::{Color, Move, Piece, PieceKind, Position};
