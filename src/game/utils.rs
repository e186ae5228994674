use crate::models::piece::{Color, Move};

/// Move-log notation, e.g. `white-pawn e2->e4`
pub fn move_notation(mv: &Move) -> String {
    format!(
        "{} {}->{}",
        mv.piece,
        mv.from.square_name(),
        mv.to.square_name()
    )
}

/// Winner of a game resigned by `resigner`
pub fn winner_on_resign(resigner: Color) -> Color {
    resigner.opponent()
}
