use futures::lock::Mutex;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::models::game_state::BoardState;

/// A board behind its own per-game lock
///
/// Holding the guard is the exclusive scope for validate+mutate on one game.
pub type SharedBoard = Arc<Mutex<BoardState>>;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct CacheEntry {
    board: SharedBoard,
    updated_at: Instant,
}

/// Live boards keyed by game id, with idle expiry.
///
/// The map itself is guarded by a reader/writer lock: lookups share it,
/// inserts and removals take it exclusively. An entry idle for longer than
/// the timeout reads as absent even before `evict_idle` purges it.
pub struct BoardCache {
    entries: RwLock<HashMap<Uuid, CacheEntry>>,
    idle_timeout: Duration,
}

impl BoardCache {
    pub fn new(idle_timeout: Duration) -> Self {
        BoardCache {
            entries: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn get(&self, game_id: &Uuid) -> Option<SharedBoard> {
        self.get_at(game_id, Instant::now())
    }

    fn get_at(&self, game_id: &Uuid, now: Instant) -> Option<SharedBoard> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(game_id)
            .filter(|entry| !self.is_idle(entry, now))
            .map(|entry| entry.board.clone())
    }

    /// Insert or replace the board for a game, stamping it as fresh.
    pub fn put(&self, game_id: Uuid, board: BoardState) -> SharedBoard {
        let shared = Arc::new(Mutex::new(board));
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            game_id,
            CacheEntry {
                board: shared.clone(),
                updated_at: Instant::now(),
            },
        );
        shared
    }

    /// Insert `board` unless a live board already exists for the game.
    ///
    /// Returns `false` when an existing board was kept.
    pub fn put_if_absent(&self, game_id: Uuid, board: BoardState) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get(&game_id) {
            if !self.is_idle(entry, now) {
                return false;
            }
        }
        entries.insert(
            game_id,
            CacheEntry {
                board: Arc::new(Mutex::new(board)),
                updated_at: now,
            },
        );
        true
    }

    /// Refresh the idle timestamp of a live board.
    pub fn touch(&self, game_id: &Uuid) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(game_id) {
            entry.updated_at = Instant::now();
        }
    }

    pub fn remove(&self, game_id: &Uuid) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(game_id).is_some()
    }

    /// Drop every board idle past the timeout, returning how many went.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    fn evict_idle_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !self.is_idle(entry, now));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("Evicted {} idle boards, {} remain", evicted, entries.len());
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_idle(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.updated_at) > self.idle_timeout
    }
}

impl Default for BoardCache {
    fn default() -> Self {
        BoardCache::new(DEFAULT_IDLE_TIMEOUT)
    }
}
