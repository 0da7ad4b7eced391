//! Move legality, terminal classification, and move execution.
//!
//! Legality runs in two phases: a per-piece pseudo-legal pass (movement
//! pattern plus blocking, including castling and en passant), then a filter
//! that relocates the piece on a scratch board and rejects any destination
//! leaving the mover's own king attacked. The filter leans on the attack
//! generator in `board.rs` only; attack generation never calls back into
//! legality, which keeps the check test non-recursive.

use serde::{Deserialize, Serialize};

use crate::board::{Board, DIAGONAL_DIRS, KNIGHT_OFFSETS, STRAIGHT_DIRS};
use crate::moves::{LegalMoveSet, MoveKind, MoveRecord, RookMove, Square};
use crate::piece::{Color, Piece, PieceType};

/// Classification of a position for the side to move.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
}

/// All strictly legal destinations for the piece at `from`. Empty when the
/// square is empty or the piece has no legal move. `history` is only read
/// for its last record, to decide en passant.
pub fn legal_moves(board: &Board, from: Square, history: &[MoveRecord]) -> LegalMoveSet {
    let piece = match board.piece_at(from) {
        Some(p) => p,
        None => return LegalMoveSet::new(),
    };

    let mut candidates = LegalMoveSet::new();
    match piece.piece_type {
        PieceType::Pawn => pawn_moves(board, from, piece, history, &mut candidates),
        PieceType::Rook => sliding_moves(board, from, piece, &STRAIGHT_DIRS, &mut candidates),
        PieceType::Bishop => sliding_moves(board, from, piece, &DIAGONAL_DIRS, &mut candidates),
        PieceType::Queen => {
            sliding_moves(board, from, piece, &STRAIGHT_DIRS, &mut candidates);
            sliding_moves(board, from, piece, &DIAGONAL_DIRS, &mut candidates);
        }
        PieceType::Knight => knight_moves(board, from, piece, &mut candidates),
        PieceType::King => king_moves(board, from, piece, &mut candidates),
    }

    candidates
        .into_iter()
        .filter(|&(to, _)| !leaves_king_exposed(board, piece.color, from, to))
        .collect()
}

/// Relocate the piece on a scratch copy and test whether the mover's king is
/// attacked afterward. Relocation only — king safety depends on the final
/// placement, so the special-move side effects are not needed here.
fn leaves_king_exposed(board: &Board, color: Color, from: Square, to: Square) -> bool {
    let mut scratch = board.clone();
    if let Some(p) = scratch.remove(from) {
        scratch.place(to, p);
    }
    scratch.is_in_check(color)
}

fn pawn_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    history: &[MoveRecord],
    out: &mut LegalMoveSet,
) {
    let (dir, start_row): (i32, usize) = match piece.color {
        Color::White => (-1, 6),
        Color::Black => (1, 1),
    };
    let (row, col) = (from.0 as i32, from.1 as i32);
    let forward = row + dir;

    // Forward pushes. The double push needs the starting rank and both
    // squares empty.
    if Board::in_bounds(forward, col) && board.piece_at((forward as usize, from.1)).is_none() {
        out.insert((forward as usize, from.1), MoveKind::Quiet);

        if from.0 == start_row {
            let double = (forward + dir) as usize;
            if board.piece_at((double, from.1)).is_none() {
                out.insert((double, from.1), MoveKind::Quiet);
            }
        }
    }

    // Diagonals: only as captures or qualifying en passant, never as quiet
    // slides.
    for dc in [-1, 1] {
        let c = col + dc;
        if !Board::in_bounds(forward, c) {
            continue;
        }
        let to = (forward as usize, c as usize);
        match board.piece_at(to) {
            Some(target) if target.color != piece.color => {
                out.insert(to, MoveKind::Capture);
            }
            Some(_) => {}
            None => {
                if en_passant_allowed(piece, from, to, history) {
                    out.insert(to, MoveKind::EnPassant);
                }
            }
        }
    }
}

/// En passant is legal only on the ply immediately after an opposing pawn's
/// two-square advance that landed beside the capturing pawn, and the target
/// file must match that pawn's file.
fn en_passant_allowed(piece: Piece, from: Square, to: Square, history: &[MoveRecord]) -> bool {
    let last = match history.last() {
        Some(record) => record,
        None => return false,
    };
    last.piece.piece_type == PieceType::Pawn
        && last.piece.color != piece.color
        && last.from.0.abs_diff(last.to.0) == 2
        && last.to.1 == to.1
        && last.to.0 == from.0
}

fn knight_moves(board: &Board, from: Square, piece: Piece, out: &mut LegalMoveSet) {
    for (dr, dc) in KNIGHT_OFFSETS {
        let (r, c) = (from.0 as i32 + dr, from.1 as i32 + dc);
        if !Board::in_bounds(r, c) {
            continue;
        }
        let to = (r as usize, c as usize);
        match board.piece_at(to) {
            Some(target) if target.color != piece.color => {
                out.insert(to, MoveKind::Capture);
            }
            Some(_) => {}
            None => {
                out.insert(to, MoveKind::Quiet);
            }
        }
    }
}

fn sliding_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    directions: &[(i32, i32)],
    out: &mut LegalMoveSet,
) {
    for &(dr, dc) in directions {
        let mut r = from.0 as i32 + dr;
        let mut c = from.1 as i32 + dc;
        while Board::in_bounds(r, c) {
            let to = (r as usize, c as usize);
            match board.piece_at(to) {
                Some(target) => {
                    if target.color != piece.color {
                        out.insert(to, MoveKind::Capture);
                    }
                    break;
                }
                None => {
                    out.insert(to, MoveKind::Quiet);
                }
            }
            r += dr;
            c += dc;
        }
    }
}

fn king_moves(board: &Board, from: Square, piece: Piece, out: &mut LegalMoveSet) {
    for dr in -1..=1i32 {
        for dc in -1..=1i32 {
            if dr == 0 && dc == 0 {
                continue;
            }
            let (r, c) = (from.0 as i32 + dr, from.1 as i32 + dc);
            if !Board::in_bounds(r, c) {
                continue;
            }
            let to = (r as usize, c as usize);
            match board.piece_at(to) {
                Some(target) if target.color != piece.color => {
                    out.insert(to, MoveKind::Capture);
                }
                Some(_) => {}
                None => {
                    out.insert(to, MoveKind::Quiet);
                }
            }
        }
    }

    castling_moves(board, from, piece, out);
}

fn castling_moves(board: &Board, from: Square, piece: Piece, out: &mut LegalMoveSet) {
    let back_rank = match piece.color {
        Color::White => 7,
        Color::Black => 0,
    };
    if piece.has_moved || from != (back_rank, 4) {
        return;
    }
    if board.is_in_check(piece.color) {
        return;
    }

    let enemy = piece.color.opposite();
    let unmoved_rook = |sq: Square| {
        board
            .piece_at(sq)
            .map(|p| p.piece_type == PieceType::Rook && p.color == piece.color && !p.has_moved)
            .unwrap_or(false)
    };

    // Kingside: f and g files empty, rook on h unmoved, and the king may not
    // pass through an attacked f-file square. The destination square is
    // covered by the ordinary legality filter.
    if unmoved_rook((back_rank, 7))
        && board.piece_at((back_rank, 5)).is_none()
        && board.piece_at((back_rank, 6)).is_none()
        && !board.is_square_attacked((back_rank, 5), enemy)
    {
        out.insert((back_rank, 6), MoveKind::Castle);
    }

    // Queenside: b, c, d files empty, rook on a unmoved, transit d-file safe.
    if unmoved_rook((back_rank, 0))
        && board.piece_at((back_rank, 1)).is_none()
        && board.piece_at((back_rank, 2)).is_none()
        && board.piece_at((back_rank, 3)).is_none()
        && !board.is_square_attacked((back_rank, 3), enemy)
    {
        out.insert((back_rank, 2), MoveKind::Castle);
    }
}

fn has_any_legal_move(board: &Board, color: Color, history: &[MoveRecord]) -> bool {
    for r in 0..8 {
        for c in 0..8 {
            if let Some(p) = board.piece_at((r, c)) {
                if p.color == color && !legal_moves(board, (r, c), history).is_empty() {
                    return true;
                }
            }
        }
    }
    false
}

/// Classify the position for `color` as the side to move. Having no legal
/// move is not an error: it is checkmate when in check, stalemate otherwise.
pub fn game_status(board: &Board, color: Color, history: &[MoveRecord]) -> GameStatus {
    let in_check = board.is_in_check(color);
    if has_any_legal_move(board, color, history) {
        if in_check {
            GameStatus::Check
        } else {
            GameStatus::Active
        }
    } else if in_check {
        GameStatus::Checkmate
    } else {
        GameStatus::Stalemate
    }
}

/// Execute a move, returning the successor board and its record. The input
/// board is never touched; callers holding it keep a valid position. Returns
/// `None` when `from` is empty. Legality is the caller's concern — feed this
/// destinations from `legal_moves`.
pub fn apply_move(
    board: &Board,
    from: Square,
    to: Square,
    history: &[MoveRecord],
) -> Option<(Board, MoveRecord)> {
    let piece = board.piece_at(from)?;
    let mut next = board.clone();

    let destination_occupant = next.piece_at(to);
    let mut captured = destination_occupant;

    next.remove(from);
    let mut moved = piece;
    moved.has_moved = true;
    next.place(to, moved);

    // A pawn reaching the far rank always becomes a queen.
    let mut promotion = None;
    if piece.piece_type == PieceType::Pawn && (to.0 == 0 || to.0 == 7) {
        promotion = Some(PieceType::Queen);
        next.place(
            to,
            Piece {
                piece_type: PieceType::Queen,
                color: piece.color,
                has_moved: true,
            },
        );
    }

    // A diagonal pawn move into an empty square is en passant: the victim
    // sits on the origin rank at the destination file.
    if piece.piece_type == PieceType::Pawn && from.1 != to.1 && destination_occupant.is_none() {
        captured = next.remove((from.0, to.1));
    }

    // A king moving two files is a castle; displace the matching rook.
    let mut rook_move = None;
    if piece.piece_type == PieceType::King && from.1.abs_diff(to.1) == 2 {
        let (rook_from, rook_to) = if to.1 > from.1 {
            ((from.0, 7), (from.0, 5))
        } else {
            ((from.0, 0), (from.0, 3))
        };
        if let Some(mut rook) = next.remove(rook_from) {
            rook.has_moved = true;
            next.place(rook_to, rook);
            rook_move = Some(RookMove {
                from: rook_from,
                to: rook_to,
            });
        }
    }

    let mut record = MoveRecord {
        piece,
        from,
        to,
        captured,
        is_capture: captured.is_some(),
        is_check: false,
        is_checkmate: false,
        is_castle: rook_move.is_some(),
        rook_move,
        promotion,
    };

    // Classify the opponent's situation. Checkmate must be judged against a
    // history that already contains this move, so the opponent's en passant
    // replies are generated correctly.
    let opponent = piece.color.opposite();
    if next.is_in_check(opponent) {
        record.is_check = true;
        let mut extended = history.to_vec();
        extended.push(record.clone());
        record.is_checkmate = !has_any_legal_move(&next, opponent, &extended);
    }

    Some((next, record))
}
