//! Request-level game logic.
//!
//! `GameSessions` ties the board cache, the legality rules and the durable
//! store together and makes the accept/reject decision for every move and
//! lifecycle action. Each board is guarded by its own async lock, held from
//! validation through mutation, so two submissions against the same game
//! never both act on the same pre-move state.

use log::{debug, error, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::{BoardCache, ExpiringCache, SharedBoard};
use crate::config::Config;
use crate::error::GameError;
use crate::game::rules;
use crate::game::utils::{move_notation, winner_on_resign};
use crate::models::game_state::BoardState;
use crate::models::messages::BoardPoll;
use crate::models::piece::{Color, Move};
use crate::store::{Account, GameId, GameRecord, GameStatus, GameStore, UserId};

pub type GameResult<T> = Result<T, GameError>;

/// Accepted move as recorded in the move log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub number: u32,
    pub notation: String,
}

pub struct GameSessions {
    store: Arc<dyn GameStore>,
    boards: BoardCache,
    tokens: ExpiringCache<String, UserId>,
    participants: ExpiringCache<(GameId, UserId), Color>,
    session_ttl: Duration,
    participation_ttl: Duration,
}

impl GameSessions {
    pub fn new(store: Arc<dyn GameStore>, config: &Config) -> Self {
        GameSessions {
            store,
            boards: BoardCache::new(config.board_idle_timeout),
            tokens: ExpiringCache::new(),
            participants: ExpiringCache::new(),
            session_ttl: config.session_ttl,
            participation_ttl: config.participation_ttl,
        }
    }

    pub fn boards(&self) -> &BoardCache {
        &self.boards
    }

    /// Resolve a session token to a user id.
    ///
    /// A cached token never outlives the expiry the store granted it.
    pub async fn authenticate(&self, token: &str) -> GameResult<UserId> {
        if token.is_empty() {
            return Err(GameError::Unauthenticated);
        }
        if let Some(user_id) = self.tokens.get(&token.to_string()) {
            return Ok(user_id);
        }
        let grant = self
            .store
            .user_for_token(token)
            .await?
            .ok_or(GameError::Unauthenticated)?;
        let remaining = grant.expires_at.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(GameError::Unauthenticated);
        }
        self.tokens
            .insert(token.to_string(), grant.user_id, remaining.min(self.session_ttl));
        Ok(grant.user_id)
    }

    pub async fn register(&self, username: &str, password: &str) -> GameResult<Account> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(GameError::BadRequest(
                "username and password are required".to_string(),
            ));
        }
        let id = self.store.create_user(username, password).await?;
        info!("Registered user {} as {}", id, username);
        Ok(Account {
            id,
            username: username.to_string(),
        })
    }

    /// Check credentials and open a session; returns the token and user id.
    pub async fn login(&self, username: &str, password: &str) -> GameResult<(String, UserId)> {
        let user_id = self
            .store
            .check_credentials(username.trim(), password)
            .await?
            .ok_or(GameError::InvalidCredentials)?;
        let token = self.store.create_session(user_id, self.session_ttl).await?;
        info!("User {} logged in", user_id);
        Ok((token, user_id))
    }

    /// Invalidate a token everywhere it is known.
    pub async fn logout(&self, token: &str) -> GameResult<()> {
        let user_id = self.authenticate(token).await?;
        self.store.delete_session(token).await?;
        self.tokens.remove(&token.to_string());
        info!("User {} logged out", user_id);
        Ok(())
    }

    pub async fn account(&self, user_id: UserId) -> GameResult<Account> {
        self.store
            .account(user_id)
            .await?
            .ok_or(GameError::Unauthenticated)
    }

    /// Color `user_id` plays in the game.
    ///
    /// Only seated players are cached; a stranger may still join later.
    pub async fn player_color(&self, game_id: GameId, user_id: UserId) -> GameResult<Color> {
        if let Some(color) = self.participants.get(&(game_id, user_id)) {
            return Ok(color);
        }
        let color = self
            .store
            .user_color_in_game(game_id, user_id)
            .await?
            .ok_or(GameError::NotAParticipant)?;
        self.participants
            .insert((game_id, user_id), color, self.participation_ttl);
        Ok(color)
    }

    pub async fn create_game(&self, creator: UserId) -> GameResult<GameId> {
        let game_id = self.store.create_game(creator).await?;
        if !self.boards.put_if_absent(game_id, BoardState::initial()) {
            info!("Board for new game {} already cached, keeping it", game_id);
        }
        info!("User {} created game {}", creator, game_id);
        Ok(game_id)
    }

    pub async fn open_games(&self) -> GameResult<Vec<GameRecord>> {
        Ok(self.store.open_games().await?)
    }

    /// Take the black seat. The board is not touched.
    pub async fn join_game(&self, game_id: GameId, joiner: UserId) -> GameResult<()> {
        let record = self.record(game_id).await?;
        if record.white == Some(joiner) {
            return Err(GameError::BadRequest(
                "cannot join your own game".to_string(),
            ));
        }
        self.store.join_as_black(game_id, joiner).await?;
        info!("User {} joined game {} as black", joiner, game_id);
        Ok(())
    }

    pub async fn submit_move(
        &self,
        game_id: GameId,
        user_id: UserId,
        mv: Move,
    ) -> GameResult<MoveOutcome> {
        let shared = self.live_board(&game_id)?;
        let color = self.player_color(game_id, user_id).await?;

        let mut board = shared.lock().await;
        self.require_active(game_id).await?;

        if color != board.turn() {
            debug!("Game {}: {} moved out of turn", game_id, color);
            return Err(GameError::NotYourTurn);
        }
        if let Err(reason) = rules::validate(&board, &mv) {
            debug!("Game {}: rejected {:?}: {}", game_id, mv, reason);
            return Err(reason.into());
        }

        let notation = move_notation(&mv);
        let number = match self.store.append_move(game_id, user_id, &notation).await {
            Ok(number) => number,
            Err(e) => {
                error!(
                    "Game {}: failed to log move '{}', board left unchanged: {}",
                    game_id, notation, e
                );
                return Err(e.into());
            }
        };

        board.apply(&mv, number, notation.clone());
        drop(board);
        self.boards.touch(&game_id);

        info!("Game {}: move {} {}", game_id, number, notation);
        Ok(MoveOutcome { number, notation })
    }

    /// Record a draw offer from the caller's color, superseding any earlier one.
    pub async fn offer_draw(&self, game_id: GameId, offeror: UserId) -> GameResult<Color> {
        let shared = self.live_board(&game_id)?;
        let color = self.player_color(game_id, offeror).await?;

        let mut board = shared.lock().await;
        self.require_active(game_id).await?;
        board.draw_offer = Some(color);
        drop(board);
        self.boards.touch(&game_id);

        info!("Game {}: {} offered a draw", game_id, color);
        Ok(color)
    }

    /// Accept the opponent's pending offer and finish the game without a winner.
    pub async fn accept_draw(&self, game_id: GameId, accepter: UserId) -> GameResult<()> {
        let shared = self.live_board(&game_id)?;
        let color = self.player_color(game_id, accepter).await?;

        let mut board = shared.lock().await;
        self.require_active(game_id).await?;
        Self::require_offer_from(&board, color.opponent())?;

        self.store.finish_as_draw(game_id).await?;
        board.draw_offer = None;
        drop(board);
        self.boards.touch(&game_id);

        info!("Game {}: {} accepted the draw, game over", game_id, color);
        Ok(())
    }

    /// Turn down the opponent's pending offer; the game goes on.
    pub async fn decline_draw(&self, game_id: GameId, decliner: UserId) -> GameResult<()> {
        let shared = self.live_board(&game_id)?;
        let color = self.player_color(game_id, decliner).await?;

        let mut board = shared.lock().await;
        self.require_active(game_id).await?;
        Self::require_offer_from(&board, color.opponent())?;
        board.draw_offer = None;
        drop(board);
        self.boards.touch(&game_id);

        info!("Game {}: {} declined the draw", game_id, color);
        Ok(())
    }

    /// Resign on behalf of the caller; returns the winning color.
    pub async fn resign(&self, game_id: GameId, resigner: UserId) -> GameResult<Color> {
        let color = self.player_color(game_id, resigner).await?;

        // The board may have idled out; resigning only needs the record.
        let shared = self.boards.get(&game_id);
        let mut board = match &shared {
            Some(shared) => Some(shared.lock().await),
            None => None,
        };
        self.require_active(game_id).await?;

        let winner = winner_on_resign(color);
        self.store.finish_with_winner(game_id, winner).await?;
        if let Some(mut board) = board.take() {
            board.draw_offer = None;
            drop(board);
            self.boards.touch(&game_id);
        }

        info!("Game {}: {} resigned, {} wins", game_id, color, winner);
        Ok(winner)
    }

    /// Snapshot for client polling: last move and any pending draw offer.
    pub async fn poll_board(&self, game_id: GameId) -> GameResult<BoardPoll> {
        if let Some(shared) = self.boards.get(&game_id) {
            let board = shared.lock().await;
            return Ok(BoardPoll {
                number: board.last_move_number,
                notation: board.last_move_notation.clone(),
                draw_offer: board.draw_offer,
            });
        }

        // Evicted board: the move log still knows the last move.
        self.record(game_id).await?;
        let (number, notation) = self.store.last_move(game_id).await?.unwrap_or_default();
        Ok(BoardPoll {
            number,
            notation,
            draw_offer: None,
        })
    }

    /// Copy of the live board, for inspection.
    pub async fn board_snapshot(&self, game_id: GameId) -> GameResult<BoardState> {
        let shared = self.live_board(&game_id)?;
        let board = shared.lock().await;
        Ok(board.clone())
    }

    /// Sweep idle boards and expired cache entries; returns entries dropped.
    pub fn evict_expired(&self) -> usize {
        self.boards.evict_idle() + self.tokens.evict_expired() + self.participants.evict_expired()
    }

    fn live_board(&self, game_id: &GameId) -> GameResult<SharedBoard> {
        self.boards.get(game_id).ok_or(GameError::GameNotFound)
    }

    async fn record(&self, game_id: GameId) -> GameResult<GameRecord> {
        self.store
            .game(game_id)
            .await?
            .ok_or(GameError::GameNotFound)
    }

    async fn require_active(&self, game_id: GameId) -> GameResult<()> {
        match self.record(game_id).await?.status {
            GameStatus::Active => Ok(()),
            GameStatus::Open => Err(GameError::GameNotActive),
            GameStatus::Finished => Err(GameError::GameFinished),
        }
    }

    fn require_offer_from(board: &BoardState, offeror: Color) -> GameResult<()> {
        if board.draw_offer == Some(offeror) {
            Ok(())
        } else {
            Err(GameError::NoDrawOffer)
        }
    }
}
