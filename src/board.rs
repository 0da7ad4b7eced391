use serde::{Deserialize, Serialize};

use crate::moves::Square;
use crate::piece::{Color, Piece, PieceType};

pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

pub const STRAIGHT_DIRS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

pub const DIAGONAL_DIRS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// The 8x8 grid. Row 0 is black's back rank, row 7 white's, so white pawns
/// advance toward row 0.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Board {
    pub squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// The standard initial layout.
    pub fn new() -> Self {
        let mut squares = [[None; 8]; 8];

        // Black pieces (rows 0-1)
        squares[0][0] = Some(Piece::new(PieceType::Rook, Color::Black));
        squares[0][1] = Some(Piece::new(PieceType::Knight, Color::Black));
        squares[0][2] = Some(Piece::new(PieceType::Bishop, Color::Black));
        squares[0][3] = Some(Piece::new(PieceType::Queen, Color::Black));
        squares[0][4] = Some(Piece::new(PieceType::King, Color::Black));
        squares[0][5] = Some(Piece::new(PieceType::Bishop, Color::Black));
        squares[0][6] = Some(Piece::new(PieceType::Knight, Color::Black));
        squares[0][7] = Some(Piece::new(PieceType::Rook, Color::Black));
        for sq in &mut squares[1] {
            *sq = Some(Piece::new(PieceType::Pawn, Color::Black));
        }

        // White pieces (rows 6-7)
        for sq in &mut squares[6] {
            *sq = Some(Piece::new(PieceType::Pawn, Color::White));
        }
        squares[7][0] = Some(Piece::new(PieceType::Rook, Color::White));
        squares[7][1] = Some(Piece::new(PieceType::Knight, Color::White));
        squares[7][2] = Some(Piece::new(PieceType::Bishop, Color::White));
        squares[7][3] = Some(Piece::new(PieceType::Queen, Color::White));
        squares[7][4] = Some(Piece::new(PieceType::King, Color::White));
        squares[7][5] = Some(Piece::new(PieceType::Bishop, Color::White));
        squares[7][6] = Some(Piece::new(PieceType::Knight, Color::White));
        squares[7][7] = Some(Piece::new(PieceType::Rook, Color::White));

        Board { squares }
    }

    pub fn in_bounds(row: i32, col: i32) -> bool {
        (0..8).contains(&row) && (0..8).contains(&col)
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.0][sq.1]
    }

    /// Put a piece on a square. Along with `remove`, the only mutation the
    /// executor uses.
    pub fn place(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.0][sq.1] = Some(piece);
    }

    /// Clear a square, returning whatever occupied it.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.0][sq.1].take()
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        for r in 0..8 {
            for c in 0..8 {
                if let Some(p) = self.squares[r][c] {
                    if p.piece_type == PieceType::King && p.color == color {
                        return Some((r, c));
                    }
                }
            }
        }
        None
    }

    /// The squares the piece at `sq` threatens: its movement pattern with
    /// blocking applied, but no castling, no en passant, and no self-check
    /// filter. Pawns threaten only their two forward diagonals, which is why
    /// this is distinct from move generation — check detection uses attack
    /// sets so legality filtering never has to recurse into itself.
    pub fn attack_squares(&self, sq: Square) -> Vec<Square> {
        let piece = match self.piece_at(sq) {
            Some(p) => p,
            None => return Vec::new(),
        };

        let (row, col) = (sq.0 as i32, sq.1 as i32);
        let mut attacks = Vec::new();

        match piece.piece_type {
            PieceType::Pawn => {
                let dir: i32 = if piece.color == Color::White { -1 } else { 1 };
                for dc in [-1, 1] {
                    if Self::in_bounds(row + dir, col + dc) {
                        attacks.push(((row + dir) as usize, (col + dc) as usize));
                    }
                }
            }
            PieceType::Knight => {
                for (dr, dc) in KNIGHT_OFFSETS {
                    let (r, c) = (row + dr, col + dc);
                    if !Self::in_bounds(r, c) {
                        continue;
                    }
                    let own = self.squares[r as usize][c as usize]
                        .map(|p| p.color == piece.color)
                        .unwrap_or(false);
                    if !own {
                        attacks.push((r as usize, c as usize));
                    }
                }
            }
            PieceType::King => {
                // All eight neighbors, own pieces included. The king's attack
                // set is only ever used to ask whether a square is covered.
                for dr in -1..=1 {
                    for dc in -1..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        if Self::in_bounds(row + dr, col + dc) {
                            attacks.push(((row + dr) as usize, (col + dc) as usize));
                        }
                    }
                }
            }
            PieceType::Rook => self.sliding_attacks(sq, piece.color, &STRAIGHT_DIRS, &mut attacks),
            PieceType::Bishop => self.sliding_attacks(sq, piece.color, &DIAGONAL_DIRS, &mut attacks),
            PieceType::Queen => {
                self.sliding_attacks(sq, piece.color, &STRAIGHT_DIRS, &mut attacks);
                self.sliding_attacks(sq, piece.color, &DIAGONAL_DIRS, &mut attacks);
            }
        }

        attacks
    }

    /// Walk each direction until blocked by the edge or a piece; the blocking
    /// square counts only when the blocker is opposite-colored.
    fn sliding_attacks(
        &self,
        sq: Square,
        color: Color,
        directions: &[(i32, i32)],
        attacks: &mut Vec<Square>,
    ) {
        for &(dr, dc) in directions {
            let mut r = sq.0 as i32 + dr;
            let mut c = sq.1 as i32 + dc;
            while Self::in_bounds(r, c) {
                match self.squares[r as usize][c as usize] {
                    Some(p) => {
                        if p.color != color {
                            attacks.push((r as usize, c as usize));
                        }
                        break;
                    }
                    None => attacks.push((r as usize, c as usize)),
                }
                r += dr;
                c += dc;
            }
        }
    }

    /// Whether any piece of `attacker`'s color threatens `target`.
    pub fn is_square_attacked(&self, target: Square, attacker: Color) -> bool {
        self.find_attacker_of(target, attacker).is_some()
    }

    /// The square of some `attacker`-colored piece threatening `target`, if
    /// one exists. Used to identify the checking piece when ordering
    /// check-resolution moves.
    pub fn find_attacker_of(&self, target: Square, attacker: Color) -> Option<Square> {
        for r in 0..8 {
            for c in 0..8 {
                if let Some(p) = self.squares[r][c] {
                    if p.color == attacker && self.attack_squares((r, c)).contains(&target) {
                        return Some((r, c));
                    }
                }
            }
        }
        None
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king) => self.is_square_attacked(king, color.opposite()),
            None => false,
        }
    }

    /// The piece currently giving check to `color`'s king, if any.
    pub fn find_checking_piece(&self, color: Color) -> Option<Square> {
        let king = self.find_king(color)?;
        self.find_attacker_of(king, color.opposite())
    }
}
