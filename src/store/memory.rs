use async_trait::async_trait;
use log::info;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::{
    Account, GameId, GameRecord, GameStatus, GameStore, SessionGrant, StoreError, StoreResult,
    UserId,
};
use crate::cache::MAX_ENTRY_TTL;
use crate::models::piece::Color;

const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub number: u32,
    pub player_id: UserId,
    pub notation: String,
}

struct UserRow {
    id: UserId,
    salt: [u8; 16],
    password_digest: blake3::Hash,
}

fn password_digest(salt: &[u8; 16], password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize()
}

#[derive(Default)]
struct Tables {
    users: HashMap<String, UserRow>,
    usernames: HashMap<UserId, String>,
    sessions: HashMap<String, SessionGrant>,
    games: HashMap<GameId, GameRecord>,
    moves: HashMap<GameId, Vec<MoveRecord>>,
}

/// Process-local `GameStore`
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            tables: Mutex::new(Tables::default()),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a session token for `user_id`, valid for a day.
    pub fn issue_token(&self, user_id: UserId) -> String {
        self.issue_token_with_ttl(user_id, DEFAULT_TOKEN_TTL)
    }

    /// Issue a session token lasting `ttl`, capped at `MAX_ENTRY_TTL`.
    pub fn issue_token_with_ttl(&self, user_id: UserId, ttl: Duration) -> String {
        let token = Uuid::new_v4().to_string();
        let grant = SessionGrant {
            user_id,
            expires_at: Instant::now() + ttl.min(MAX_ENTRY_TTL),
        };
        self.tables().sessions.insert(token.clone(), grant);
        info!("Issued session token for user {}", user_id);
        token
    }

    pub fn revoke_token(&self, token: &str) {
        if self.tables().sessions.remove(token).is_some() {
            info!("Revoked a session token");
        }
    }

    /// Full move log of a game, oldest first.
    pub fn moves(&self, game_id: GameId) -> Vec<MoveRecord> {
        self.tables()
            .moves
            .get(&game_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn create_user(&self, username: &str, password: &str) -> StoreResult<UserId> {
        let mut tables = self.tables();
        if tables.users.contains_key(username) {
            return Err(StoreError::UsernameTaken);
        }
        let id = tables.users.len() as UserId + 1;
        let salt: [u8; 16] = rand::random();
        tables.users.insert(
            username.to_string(),
            UserRow {
                id,
                salt,
                password_digest: password_digest(&salt, password),
            },
        );
        tables.usernames.insert(id, username.to_string());
        Ok(id)
    }

    async fn check_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> StoreResult<Option<UserId>> {
        let tables = self.tables();
        Ok(tables
            .users
            .get(username)
            .filter(|row| password_digest(&row.salt, password) == row.password_digest)
            .map(|row| row.id))
    }

    async fn account(&self, user_id: UserId) -> StoreResult<Option<Account>> {
        Ok(self.tables().usernames.get(&user_id).map(|username| Account {
            id: user_id,
            username: username.clone(),
        }))
    }

    async fn create_session(&self, user_id: UserId, ttl: Duration) -> StoreResult<String> {
        Ok(self.issue_token_with_ttl(user_id, ttl))
    }

    async fn user_for_token(&self, token: &str) -> StoreResult<Option<SessionGrant>> {
        let tables = self.tables();
        Ok(tables
            .sessions
            .get(token)
            .filter(|grant| Instant::now() <= grant.expires_at)
            .copied())
    }

    async fn delete_session(&self, token: &str) -> StoreResult<()> {
        self.revoke_token(token);
        Ok(())
    }

    async fn create_game(&self, white: UserId) -> StoreResult<GameId> {
        let id = Uuid::new_v4();
        self.tables().games.insert(
            id,
            GameRecord {
                id,
                white: Some(white),
                black: None,
                status: GameStatus::Open,
                winner: None,
            },
        );
        Ok(id)
    }

    async fn game(&self, game_id: GameId) -> StoreResult<Option<GameRecord>> {
        Ok(self.tables().games.get(&game_id).cloned())
    }

    async fn open_games(&self) -> StoreResult<Vec<GameRecord>> {
        Ok(self
            .tables()
            .games
            .values()
            .filter(|game| game.status != GameStatus::Finished)
            .cloned()
            .collect())
    }

    async fn join_as_black(&self, game_id: GameId, user_id: UserId) -> StoreResult<()> {
        let mut tables = self.tables();
        let game = tables.games.get_mut(&game_id).ok_or(StoreError::NotFound)?;
        if game.black.is_some() || game.status == GameStatus::Finished {
            return Err(StoreError::SeatTaken);
        }
        game.black = Some(user_id);
        game.status = GameStatus::Active;
        Ok(())
    }

    async fn user_color_in_game(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> StoreResult<Option<Color>> {
        let tables = self.tables();
        let game = tables.games.get(&game_id).ok_or(StoreError::NotFound)?;
        Ok(game.color_of(user_id))
    }

    async fn finish_with_winner(&self, game_id: GameId, winner: Color) -> StoreResult<()> {
        let mut tables = self.tables();
        let game = tables.games.get_mut(&game_id).ok_or(StoreError::NotFound)?;
        game.status = GameStatus::Finished;
        game.winner = Some(winner);
        Ok(())
    }

    async fn finish_as_draw(&self, game_id: GameId) -> StoreResult<()> {
        let mut tables = self.tables();
        let game = tables.games.get_mut(&game_id).ok_or(StoreError::NotFound)?;
        game.status = GameStatus::Finished;
        game.winner = None;
        Ok(())
    }

    async fn append_move(
        &self,
        game_id: GameId,
        player_id: UserId,
        notation: &str,
    ) -> StoreResult<u32> {
        let mut tables = self.tables();
        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::NotFound);
        }
        let log = tables.moves.entry(game_id).or_default();
        let number = log.len() as u32 + 1;
        log.push(MoveRecord {
            number,
            player_id,
            notation: notation.to_string(),
        });
        Ok(number)
    }

    async fn last_move(&self, game_id: GameId) -> StoreResult<Option<(u32, String)>> {
        Ok(self
            .tables()
            .moves
            .get(&game_id)
            .and_then(|log| log.last())
            .map(|record| (record.number, record.notation.clone())))
    }
}
