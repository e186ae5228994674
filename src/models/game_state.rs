use crate::models::piece::{Color, Move, Piece, PieceKind, Position, BOARD_SIZE};

const BACK_RANK: [PieceKind; BOARD_SIZE] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Live board for one active game
///
/// Terminal results (winner, finish time) live in the store, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    pub squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
    /// Color of the most recent accepted move, `None` before the first move
    pub last_move_color: Option<Color>,
    pub last_move_number: u32,
    pub last_move_notation: String,
    /// Color that made the outstanding draw offer, if any
    pub draw_offer: Option<Color>,
}

impl BoardState {
    /// Standard starting position with white to move.
    pub fn initial() -> Self {
        let mut board = BoardState::empty();
        for (col, kind) in BACK_RANK.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(Color::Black, *kind));
            board.squares[1][col] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            board.squares[6][col] = Some(Piece::new(Color::White, PieceKind::Pawn));
            board.squares[7][col] = Some(Piece::new(Color::White, *kind));
        }
        board
    }

    /// Board with no pieces, used to stage positions in tests.
    pub fn empty() -> Self {
        BoardState {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
            last_move_color: None,
            last_move_number: 0,
            last_move_notation: String::new(),
            draw_offer: None,
        }
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.row()][pos.col()]
    }

    pub fn place(&mut self, pos: Position, piece: Option<Piece>) {
        self.squares[pos.row()][pos.col()] = piece;
    }

    /// Color entitled to the next move
    pub fn turn(&self) -> Color {
        self.last_move_color
            .map(Color::opponent)
            .unwrap_or(Color::White)
    }

    pub fn draw_offer_pending(&self) -> bool {
        self.draw_offer.is_some()
    }

    /// Apply an already-validated move and record its log entry.
    ///
    /// The draw offer is left untouched.
    pub fn apply(&mut self, mv: &Move, number: u32, notation: String) {
        self.place(mv.to, Some(mv.piece));
        self.place(mv.from, None);
        self.last_move_color = Some(mv.piece.color);
        self.last_move_number = number;
        self.last_move_notation = notation;
    }
}

impl Default for BoardState {
    fn default() -> Self {
        BoardState::initial()
    }
}
