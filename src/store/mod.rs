//! Durable-store boundary.
//!
//! Accounts, session tokens, game records, seat assignment and the move log
//! live behind `GameStore`. The live board never goes through here.

use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

use crate::models::piece::Color;

pub mod memory;

pub use memory::MemoryStore;

pub type UserId = i64;
pub type GameId = Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("seat already taken")]
    SeatTaken,
    #[error("username already registered")]
    UsernameTaken,
    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Created, waiting for a second player
    Open,
    Active,
    Finished,
}

/// Registered player
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: UserId,
    pub username: String,
}

/// A live session token and the moment it stops being valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGrant {
    pub user_id: UserId,
    pub expires_at: Instant,
}

/// Durable game record; the terminal outcome is owned here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub id: GameId,
    pub white: Option<UserId>,
    pub black: Option<UserId>,
    pub status: GameStatus,
    /// `None` for a draw or an unfinished game
    pub winner: Option<Color>,
}

impl GameRecord {
    pub fn color_of(&self, user_id: UserId) -> Option<Color> {
        if self.white == Some(user_id) {
            Some(Color::White)
        } else if self.black == Some(user_id) {
            Some(Color::Black)
        } else {
            None
        }
    }
}

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Register a new account. Fails with `UsernameTaken` on a duplicate name.
    async fn create_user(&self, username: &str, password: &str) -> StoreResult<UserId>;

    /// Account id for matching credentials, `None` on any mismatch.
    async fn check_credentials(&self, username: &str, password: &str)
        -> StoreResult<Option<UserId>>;

    async fn account(&self, user_id: UserId) -> StoreResult<Option<Account>>;

    /// Open a session for `user_id` lasting `ttl`; returns the token.
    async fn create_session(&self, user_id: UserId, ttl: Duration) -> StoreResult<String>;

    /// Resolve a session token, `None` if unknown or expired.
    async fn user_for_token(&self, token: &str) -> StoreResult<Option<SessionGrant>>;

    /// Invalidate a session token. Unknown tokens are ignored.
    async fn delete_session(&self, token: &str) -> StoreResult<()>;

    /// Create a game with `white` seated; returns the fresh id.
    async fn create_game(&self, white: UserId) -> StoreResult<GameId>;

    async fn game(&self, game_id: GameId) -> StoreResult<Option<GameRecord>>;

    /// Games not yet finished.
    async fn open_games(&self) -> StoreResult<Vec<GameRecord>>;

    /// Seat `user_id` as black. Fails with `SeatTaken` if the seat is filled
    /// and `NotFound` if the game does not exist.
    async fn join_as_black(&self, game_id: GameId, user_id: UserId) -> StoreResult<()>;

    async fn user_color_in_game(&self, game_id: GameId, user_id: UserId)
        -> StoreResult<Option<Color>>;

    async fn finish_with_winner(&self, game_id: GameId, winner: Color) -> StoreResult<()>;

    async fn finish_as_draw(&self, game_id: GameId) -> StoreResult<()>;

    /// Append to the move log; returns the store-assigned move number.
    async fn append_move(
        &self,
        game_id: GameId,
        player_id: UserId,
        notation: &str,
    ) -> StoreResult<u32>;

    /// Most recent (number, notation) in the move log.
    async fn last_move(&self, game_id: GameId) -> StoreResult<Option<(u32, String)>>;
}
