//! Geometric move legality.
//!
//! Rules cover piece shape, path blocking, destination occupancy and turn
//! ownership. Check, castling, en passant and promotion are not modelled:
//! castling and en passant fall out as shape violations, and a king may be
//! left en prise.

use thiserror::Error;

use crate::models::game_state::BoardState;
use crate::models::piece::{Move, PieceKind, Position};

/// Reason a proposed move was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("piece cannot jump over other pieces")]
    BlockedPath,
    #[error("destination is occupied by a friendly piece")]
    OccupiedByFriendly,
    #[error("move does not fit the piece's movement pattern")]
    OutOfShapeForPiece,
    #[error("unknown piece kind")]
    UnknownPieceKind,
    #[error("square is outside the board")]
    OffBoard,
    #[error("piece is not on the origin square")]
    PieceNotAtOrigin,
}

impl IllegalMove {
    pub fn code(&self) -> &'static str {
        match self {
            IllegalMove::NotYourTurn => "NOT_YOUR_TURN",
            IllegalMove::BlockedPath => "BLOCKED_PATH",
            IllegalMove::OccupiedByFriendly => "OCCUPIED_BY_FRIENDLY",
            IllegalMove::OutOfShapeForPiece => "OUT_OF_SHAPE_FOR_PIECE",
            IllegalMove::UnknownPieceKind => "UNKNOWN_PIECE_KIND",
            IllegalMove::OffBoard => "OFF_BOARD",
            IllegalMove::PieceNotAtOrigin => "PIECE_NOT_AT_ORIGIN",
        }
    }
}

pub type Verdict = Result<(), IllegalMove>;

/// Decide whether `mv` is legal on `board`.
///
/// Turn ownership is checked before anything else, so a move by the color
/// that just moved is always `NotYourTurn` whatever its shape.
pub fn validate(board: &BoardState, mv: &Move) -> Verdict {
    if mv.piece.color != board.turn() {
        return Err(IllegalMove::NotYourTurn);
    }
    if board.piece_at(mv.from) != Some(mv.piece) {
        return Err(IllegalMove::PieceNotAtOrigin);
    }

    match mv.piece.kind {
        PieceKind::Pawn => validate_pawn(board, mv),
        PieceKind::Rook => validate_rook(board, mv),
        PieceKind::Knight => validate_knight(board, mv),
        PieceKind::Bishop => validate_bishop(board, mv),
        PieceKind::Queen => validate_queen(board, mv),
        PieceKind::King => validate_king(board, mv),
    }
}

fn validate_pawn(board: &BoardState, mv: &Move) -> Verdict {
    let color = mv.piece.color;
    let forward = color.forward();
    let (d_row, d_col) = mv.from.delta_to(&mv.to);

    if d_col == 0 && d_row == forward {
        return if board.piece_at(mv.to).is_none() {
            Ok(())
        } else {
            Err(IllegalMove::BlockedPath)
        };
    }

    if d_col == 0 && d_row == 2 * forward && mv.from.row() == color.pawn_rank() {
        let middle = mv.from.offset(forward, 0);
        return if board.piece_at(middle).is_none() && board.piece_at(mv.to).is_none() {
            Ok(())
        } else {
            Err(IllegalMove::BlockedPath)
        };
    }

    if d_col.abs() == 1 && d_row == forward {
        // Diagonals are capture-only, no en passant.
        return match board.piece_at(mv.to) {
            None => Err(IllegalMove::OutOfShapeForPiece),
            Some(target) if target.color == color => Err(IllegalMove::OccupiedByFriendly),
            Some(_) => Ok(()),
        };
    }

    Err(IllegalMove::OutOfShapeForPiece)
}

fn is_straight(d_row: i32, d_col: i32) -> bool {
    (d_row == 0) != (d_col == 0)
}

fn is_diagonal(d_row: i32, d_col: i32) -> bool {
    d_row != 0 && d_row.abs() == d_col.abs()
}

fn validate_rook(board: &BoardState, mv: &Move) -> Verdict {
    let (d_row, d_col) = mv.from.delta_to(&mv.to);
    if !is_straight(d_row, d_col) {
        return Err(IllegalMove::OutOfShapeForPiece);
    }
    slide(board, mv, d_row, d_col)
}

fn validate_bishop(board: &BoardState, mv: &Move) -> Verdict {
    let (d_row, d_col) = mv.from.delta_to(&mv.to);
    if !is_diagonal(d_row, d_col) {
        return Err(IllegalMove::OutOfShapeForPiece);
    }
    slide(board, mv, d_row, d_col)
}

fn validate_queen(board: &BoardState, mv: &Move) -> Verdict {
    let (d_row, d_col) = mv.from.delta_to(&mv.to);
    if is_straight(d_row, d_col) {
        validate_rook(board, mv)
    } else if is_diagonal(d_row, d_col) {
        validate_bishop(board, mv)
    } else {
        Err(IllegalMove::OutOfShapeForPiece)
    }
}

fn validate_knight(board: &BoardState, mv: &Move) -> Verdict {
    let (d_row, d_col) = mv.from.delta_to(&mv.to);
    match (d_row.abs(), d_col.abs()) {
        (2, 1) | (1, 2) => destination(board, mv),
        _ => Err(IllegalMove::OutOfShapeForPiece),
    }
}

fn validate_king(board: &BoardState, mv: &Move) -> Verdict {
    let (d_row, d_col) = mv.from.delta_to(&mv.to);
    if d_row.abs().max(d_col.abs()) != 1 {
        return Err(IllegalMove::OutOfShapeForPiece);
    }
    destination(board, mv)
}

/// Walk the squares strictly between origin and destination, then check the
/// destination itself.
fn slide(board: &BoardState, mv: &Move, d_row: i32, d_col: i32) -> Verdict {
    let (step_row, step_col) = (d_row.signum(), d_col.signum());
    let mut square: Position = mv.from.offset(step_row, step_col);
    while square != mv.to {
        if board.piece_at(square).is_some() {
            return Err(IllegalMove::BlockedPath);
        }
        square = square.offset(step_row, step_col);
    }
    destination(board, mv)
}

fn destination(board: &BoardState, mv: &Move) -> Verdict {
    match board.piece_at(mv.to) {
        Some(target) if target.color == mv.piece.color => Err(IllegalMove::OccupiedByFriendly),
        _ => Ok(()),
    }
}
