use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::piece::{Piece, PieceType};

/// Board coordinates as (row, col), both in 0..8. Row 0 is black's back
/// rank, row 7 is white's.
pub type Square = (usize, usize);

/// What kind of move a destination square represents for a selected piece.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum MoveKind {
    Quiet,
    Capture,
    Castle,
    EnPassant,
}

/// Legal destinations for one selected piece. Recomputed on every selection
/// or board change, never persisted. Ordered so iteration is deterministic.
pub type LegalMoveSet = BTreeMap<Square, MoveKind>;

/// The rook's displacement when a move is a castle.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct RookMove {
    pub from: Square,
    pub to: Square,
}

/// A completed move. Immutable once returned by the executor; callers keep
/// these in an ordered history. The engine itself only ever reads the last
/// record, to decide en passant legality.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct MoveRecord {
    /// The moving piece as it stood before the move.
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub captured: Option<Piece>,
    pub is_capture: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_castle: bool,
    pub rook_move: Option<RookMove>,
    pub promotion: Option<PieceType>,
}

/// Format a square as a file/rank coordinate, e.g. (7, 4) -> "e1".
pub fn square_to_coord(sq: Square) -> String {
    let file = (b'a' + sq.1 as u8) as char;
    let rank = (b'8' - sq.0 as u8) as char;
    format!("{file}{rank}")
}

/// Parse a file/rank coordinate, e.g. "e1" -> (7, 4).
pub fn coord_to_square(s: &str) -> Option<Square> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    if !(b'a'..=b'h').contains(&bytes[0]) || !(b'1'..=b'8').contains(&bytes[1]) {
        return None;
    }
    let col = (bytes[0] - b'a') as usize;
    let row = (b'8' - bytes[1]) as usize;
    Some((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_round_trip() {
        assert_eq!(square_to_coord((7, 4)), "e1");
        assert_eq!(square_to_coord((0, 0)), "a8");
        assert_eq!(coord_to_square("e1"), Some((7, 4)));
        assert_eq!(coord_to_square("a8"), Some((0, 0)));
        assert_eq!(coord_to_square("h4"), Some((4, 7)));
        assert_eq!(coord_to_square("i1"), None);
        assert_eq!(coord_to_square("e9"), None);
        assert_eq!(coord_to_square("e"), None);
    }
}
