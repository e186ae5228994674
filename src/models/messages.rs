use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::rules::IllegalMove;
use crate::models::piece::{Color, Move, Piece, Position};
use crate::store::{GameRecord, UserId};

/// Body of register and login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
}

/// Body of the lifecycle endpoints (create, join, draw, resign)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlayerTokenRequest {
    pub player_token: String,
}

/// Raw zero-based coordinate as sent by the client
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct WirePosition {
    pub row: i64,
    pub col: i64,
}

/// Move submission; `session` is the game id and `user` the session token
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MoveRequest {
    pub session: Uuid,
    pub user: String,
    pub piece: String,
    pub from: WirePosition,
    pub to: WirePosition,
}

impl MoveRequest {
    pub fn to_move(&self) -> Result<Move, IllegalMove> {
        let piece: Piece = self.piece.parse()?;
        let from = Position::new(self.from.row, self.from.col)?;
        let to = Position::new(self.to.row, self.to.col)?;
        Ok(Move::new(piece, from, to))
    }
}

/// Board poll response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BoardPoll {
    pub number: u32,
    pub notation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_offer: Option<Color>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatedGame {
    pub id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenGame {
    pub id: Uuid,
    pub player_white: Option<UserId>,
    pub player_black: Option<UserId>,
}

impl From<GameRecord> for OpenGame {
    fn from(record: GameRecord) -> Self {
        OpenGame {
            id: record.id,
            player_white: record.white,
            player_black: record.black,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Color>,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>) -> Self {
        StatusMessage {
            message: message.into(),
            winner: None,
        }
    }
}
