use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::game::rules::IllegalMove;
use crate::store::StoreError;

/// Failures reported by game operations
///
/// Everything except `PersistenceFailure` is caller error and is reported
/// as-is; store faults are rendered without detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid or expired session token")]
    Unauthenticated,
    #[error("unknown username or wrong password")]
    InvalidCredentials,
    #[error("username already registered")]
    UsernameTaken,
    #[error("user is not a player in this game")]
    NotAParticipant,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("illegal move: {0}")]
    IllegalMove(IllegalMove),
    #[error("game not found")]
    GameNotFound,
    #[error("game already has two players")]
    AlreadyFull,
    #[error("game is waiting for a second player")]
    GameNotActive,
    #[error("game is already finished")]
    GameFinished,
    #[error("no draw offer from the opponent is pending")]
    NoDrawOffer,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Unauthenticated => "UNAUTHENTICATED",
            GameError::InvalidCredentials => "INVALID_CREDENTIALS",
            GameError::UsernameTaken => "USERNAME_TAKEN",
            GameError::NotAParticipant => "NOT_A_PARTICIPANT",
            GameError::NotYourTurn => "NOT_YOUR_TURN",
            GameError::IllegalMove(reason) => reason.code(),
            GameError::GameNotFound => "GAME_NOT_FOUND",
            GameError::AlreadyFull => "ALREADY_FULL",
            GameError::GameNotActive => "GAME_NOT_ACTIVE",
            GameError::GameFinished => "GAME_FINISHED",
            GameError::NoDrawOffer => "NO_DRAW_OFFER",
            GameError::BadRequest(_) => "BAD_REQUEST",
            GameError::PersistenceFailure(_) => "INTERNAL",
        }
    }

    fn public_message(&self) -> String {
        match self {
            GameError::PersistenceFailure(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<IllegalMove> for GameError {
    fn from(reason: IllegalMove) -> Self {
        match reason {
            IllegalMove::NotYourTurn => GameError::NotYourTurn,
            other => GameError::IllegalMove(other),
        }
    }
}

impl From<StoreError> for GameError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => GameError::GameNotFound,
            StoreError::SeatTaken => GameError::AlreadyFull,
            StoreError::UsernameTaken => GameError::UsernameTaken,
            StoreError::Backend(detail) => GameError::PersistenceFailure(detail),
        }
    }
}

impl ResponseError for GameError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GameError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            GameError::UsernameTaken => StatusCode::CONFLICT,
            GameError::NotAParticipant => StatusCode::FORBIDDEN,
            GameError::NotYourTurn => StatusCode::FORBIDDEN,
            GameError::IllegalMove(_) => StatusCode::BAD_REQUEST,
            GameError::GameNotFound => StatusCode::NOT_FOUND,
            GameError::AlreadyFull => StatusCode::CONFLICT,
            GameError::GameNotActive => StatusCode::CONFLICT,
            GameError::GameFinished => StatusCode::CONFLICT,
            GameError::NoDrawOffer => StatusCode::CONFLICT,
            GameError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GameError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.public_message(),
            code: self.code(),
        })
    }
}
