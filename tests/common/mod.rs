#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use online_chess_api::store::{
    Account, GameId, GameRecord, GameStore, MemoryStore, SessionGrant, StoreError, StoreResult,
    UserId,
};
use online_chess_api::{Color, Config, GameSessions, Move, Piece, PieceKind, Position};

pub const WHITE: UserId = 1;
pub const BLACK: UserId = 2;
pub const STRANGER: UserId = 99;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Memory store that can be told to fail or stall move-log writes.
pub struct TestStore {
    pub inner: MemoryStore,
    fail_appends: AtomicBool,
    append_delay: Duration,
}

impl TestStore {
    pub fn new() -> Self {
        Self::with_append_delay(Duration::ZERO)
    }

    pub fn with_append_delay(append_delay: Duration) -> Self {
        TestStore {
            inner: MemoryStore::new(),
            fail_appends: AtomicBool::new(false),
            append_delay,
        }
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl GameStore for TestStore {
    async fn create_user(&self, username: &str, password: &str) -> StoreResult<UserId> {
        self.inner.create_user(username, password).await
    }

    async fn check_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> StoreResult<Option<UserId>> {
        self.inner.check_credentials(username, password).await
    }

    async fn account(&self, user_id: UserId) -> StoreResult<Option<Account>> {
        self.inner.account(user_id).await
    }

    async fn create_session(&self, user_id: UserId, ttl: Duration) -> StoreResult<String> {
        self.inner.create_session(user_id, ttl).await
    }

    async fn user_for_token(&self, token: &str) -> StoreResult<Option<SessionGrant>> {
        self.inner.user_for_token(token).await
    }

    async fn delete_session(&self, token: &str) -> StoreResult<()> {
        self.inner.delete_session(token).await
    }

    async fn create_game(&self, white: UserId) -> StoreResult<GameId> {
        self.inner.create_game(white).await
    }

    async fn game(&self, game_id: GameId) -> StoreResult<Option<GameRecord>> {
        self.inner.game(game_id).await
    }

    async fn open_games(&self) -> StoreResult<Vec<GameRecord>> {
        self.inner.open_games().await
    }

    async fn join_as_black(&self, game_id: GameId, user_id: UserId) -> StoreResult<()> {
        self.inner.join_as_black(game_id, user_id).await
    }

    async fn user_color_in_game(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> StoreResult<Option<Color>> {
        self.inner.user_color_in_game(game_id, user_id).await
    }

    async fn finish_with_winner(&self, game_id: GameId, winner: Color) -> StoreResult<()> {
        self.inner.finish_with_winner(game_id, winner).await
    }

    async fn finish_as_draw(&self, game_id: GameId) -> StoreResult<()> {
        self.inner.finish_as_draw(game_id).await
    }

    async fn append_move(
        &self,
        game_id: GameId,
        player_id: UserId,
        notation: &str,
    ) -> StoreResult<u32> {
        if !self.append_delay.is_zero() {
            actix_rt::time::sleep(self.append_delay).await;
        }
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("move log unavailable".to_string()));
        }
        self.inner.append_move(game_id, player_id, notation).await
    }

    async fn last_move(&self, game_id: GameId) -> StoreResult<Option<(u32, String)>> {
        self.inner.last_move(game_id).await
    }
}

pub fn sessions_over(store: Arc<TestStore>) -> GameSessions {
    init_logging();
    GameSessions::new(store, &Config::default())
}

/// Game with white and black seated, ready for white's first move.
pub async fn active_game(sessions: &GameSessions) -> GameId {
    let game_id = sessions.create_game(WHITE).await.expect("create game");
    sessions.join_game(game_id, BLACK).await.expect("join game");
    game_id
}

pub fn mv(piece: &str, from: (i64, i64), to: (i64, i64)) -> Move {
    Move::new(
        piece.parse::<Piece>().expect("valid piece"),
        Position::new(from.0, from.1).expect("on board"),
        Position::new(to.0, to.1).expect("on board"),
    )
}

pub fn white(kind: PieceKind) -> Piece {
    Piece::new(Color::White, kind)
}

pub fn black(kind: PieceKind) -> Piece {
    Piece::new(Color::Black, kind)
}
