pub mod rules;
pub mod session;
pub mod utils;

pub use rules::{validate, IllegalMove};
pub use session::{GameSessions, MoveOutcome};
