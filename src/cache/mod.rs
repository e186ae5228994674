pub mod board_cache;
pub mod expiring;

pub use board_cache::{BoardCache, SharedBoard, DEFAULT_IDLE_TIMEOUT};
pub use expiring::{ExpiringCache, MAX_ENTRY_TTL};
