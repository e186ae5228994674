use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::game::rules::IllegalMove;

pub const BOARD_SIZE: usize = 8;

/// Side of the board a piece belongs to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single forward pawn step
    pub fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row the pawns of this color start on
    pub fn pawn_rank(self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Rook => "rook",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }
}

impl FromStr for PieceKind {
    type Err = IllegalMove;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pawn" => Ok(PieceKind::Pawn),
            "rook" => Ok(PieceKind::Rook),
            "knight" => Ok(PieceKind::Knight),
            "bishop" => Ok(PieceKind::Bishop),
            "queen" => Ok(PieceKind::Queen),
            "king" => Ok(PieceKind::King),
            _ => Err(IllegalMove::UnknownPieceKind),
        }
    }
}

/// A colored piece, written on the wire as `<color>-<kind>` (e.g. `white-pawn`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Piece { color, kind }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.color, self.kind.as_str())
    }
}

impl FromStr for Piece {
    type Err = IllegalMove;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (color, kind) = s.split_once('-').ok_or(IllegalMove::UnknownPieceKind)?;
        let color = match color {
            "white" => Color::White,
            "black" => Color::Black,
            _ => return Err(IllegalMove::UnknownPieceKind),
        };
        Ok(Piece::new(color, kind.parse()?))
    }
}

/// Zero-based board coordinate; row 0 is black's back rank
///
/// Only constructible through `Position::new`, so every value is on the board.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    row: usize,
    col: usize,
}

impl Position {
    /// Build a position from raw wire coordinates, rejecting anything off the board.
    pub fn new(row: i64, col: i64) -> Result<Self, IllegalMove> {
        let range = 0..BOARD_SIZE as i64;
        if !range.contains(&row) || !range.contains(&col) {
            return Err(IllegalMove::OffBoard);
        }
        Ok(Position {
            row: row as usize,
            col: col as usize,
        })
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Algebraic square name: file `'a' + col`, rank `8 - row`
    pub fn square_name(&self) -> String {
        let file = (b'a' + self.col as u8) as char;
        let rank = BOARD_SIZE - self.row;
        format!("{}{}", file, rank)
    }

    /// Signed (row, col) offset from `self` to `other`
    pub fn delta_to(&self, other: &Position) -> (i32, i32) {
        (
            other.row as i32 - self.row as i32,
            other.col as i32 - self.col as i32,
        )
    }

    /// Step by a delta the caller has already checked stays on the board.
    pub(crate) fn offset(&self, d_row: i32, d_col: i32) -> Position {
        Position {
            row: (self.row as i32 + d_row) as usize,
            col: (self.col as i32 + d_col) as usize,
        }
    }
}

/// A requested move of `piece` from one square to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub piece: Piece,
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub fn new(piece: Piece, from: Position, to: Position) -> Self {
        Move { piece, from, to }
    }
}
