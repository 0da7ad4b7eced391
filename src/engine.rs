// =============================================================================
// Chess AI engine
//
// Depth-bounded minimax with alpha-beta pruning over the move executor and
// evaluator. Leaves are always scored from the automated side's perspective.
// The candidate list comes pre-ordered by tactical relevance (check
// resolution, capturing the checker, blocking), which is what makes the
// pruning effective — sibling order is not arbitrary.
//
// Difficulty is search depth and nothing else (2/3/4 plies). A search runs
// to completion once started; there is no cancellation.
// =============================================================================

use crate::board::Board;
use crate::moves::{MoveRecord, Square};
use crate::piece::{Color, PieceType};
use crate::rules::{apply_move, game_status, legal_moves, GameStatus};

// =============================================================================
// Evaluation
// =============================================================================

/// Material values in centipawns. The king's value dwarfs everything so no
/// material swing ever outweighs losing it.
fn piece_value(pt: PieceType) -> i32 {
    match pt {
        PieceType::Pawn => 100,
        PieceType::Knight => 320,
        PieceType::Bishop => 330,
        PieceType::Rook => 500,
        PieceType::Queen => 900,
        PieceType::King => 20000,
    }
}

/// Positional bonus for pawns, indexed [row][col] from white's side; black
/// reads it mirrored. Rewards advancement and central pawns.
const PAWN_TABLE: [[i32; 8]; 8] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [50, 50, 50, 50, 50, 50, 50, 50],
    [10, 10, 20, 30, 30, 20, 10, 10],
    [5, 5, 10, 25, 25, 10, 5, 5],
    [0, 0, 0, 20, 20, 0, 0, 0],
    [5, -5, -10, 0, 0, -10, -5, 5],
    [5, 10, 10, -20, -20, 10, 10, 5],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

/// Knights rot on the rim. Vertically symmetric, so both colors read it
/// directly.
const KNIGHT_TABLE: [[i32; 8]; 8] = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20, 0, 0, 0, 0, -20, -40],
    [-30, 0, 10, 15, 15, 10, 0, -30],
    [-30, 5, 15, 20, 20, 15, 5, -30],
    [-30, 0, 15, 20, 20, 15, 0, -30],
    [-30, 5, 10, 15, 15, 10, 5, -30],
    [-40, -20, 0, 5, 5, 0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

const CHECK_BONUS: i32 = 150;

/// Score dominating any material evaluation, reserved for checkmate.
const MATE_SCORE: i32 = 10_000;

/// Static evaluation from `perspective`'s point of view: signed material,
/// pawn and knight square tables, and a flat check term. The check term is
/// relative to the asking side, so the two perspectives are deliberately not
/// exact negations of each other.
pub fn evaluate(board: &Board, perspective: Color) -> i32 {
    let mut score = 0;

    for row in 0..8 {
        for col in 0..8 {
            let piece = match board.piece_at((row, col)) {
                Some(p) => p,
                None => continue,
            };

            let mut value = piece_value(piece.piece_type);
            match piece.piece_type {
                PieceType::Pawn => {
                    value += match piece.color {
                        Color::White => PAWN_TABLE[row][col],
                        Color::Black => PAWN_TABLE[7 - row][col],
                    };
                }
                PieceType::Knight => value += KNIGHT_TABLE[row][col],
                _ => {}
            }

            if piece.color == perspective {
                score += value;
            } else {
                score -= value;
            }
        }
    }

    if board.is_in_check(perspective) {
        score -= CHECK_BONUS;
    }
    if board.is_in_check(perspective.opposite()) {
        score += CHECK_BONUS;
    }

    score
}

// =============================================================================
// Move prioritization
// =============================================================================

/// A legal move scored and tagged for search ordering.
#[derive(Clone, Debug)]
pub struct ScoredMove {
    pub from: Square,
    pub to: Square,
    /// Static evaluation of the position after the move, from the mover's
    /// perspective.
    pub score: i32,
    pub resolves_check: bool,
    pub captures_attacker: bool,
    pub blocks_check: bool,
}

/// Every legal move for `color`, ordered by tactical relevance.
///
/// When in check: moves that resolve the check come first; among those,
/// captures of the checking piece, then king moves, then interpositions,
/// and finally descending score. When not in check, descending score only.
pub fn all_moves(board: &Board, color: Color, history: &[MoveRecord]) -> Vec<ScoredMove> {
    let in_check = board.is_in_check(color);
    let checker = if in_check {
        board.find_checking_piece(color)
    } else {
        None
    };
    let king = board.find_king(color);
    let checker_slides = checker
        .and_then(|sq| board.piece_at(sq))
        .map(|p| {
            matches!(
                p.piece_type,
                PieceType::Queen | PieceType::Rook | PieceType::Bishop
            )
        })
        .unwrap_or(false);

    let mut moves = Vec::new();
    for r in 0..8 {
        for c in 0..8 {
            match board.piece_at((r, c)) {
                Some(p) if p.color == color => {}
                _ => continue,
            }
            let from = (r, c);

            for (&to, _) in legal_moves(board, from, history).iter() {
                let (next, _) = match apply_move(board, from, to, history) {
                    Some(outcome) => outcome,
                    None => continue,
                };

                let score = evaluate(&next, color);
                let resolves_check = in_check && !next.is_in_check(color);
                let captures_attacker = checker == Some(to);
                let blocks_check = match (in_check && checker_slides, king, checker) {
                    (true, Some(king), Some(attacker)) => is_between(to, king, attacker),
                    _ => false,
                };

                moves.push(ScoredMove {
                    from,
                    to,
                    score,
                    resolves_check,
                    captures_attacker,
                    blocks_check,
                });
            }
        }
    }

    moves.sort_by(|a, b| {
        use std::cmp::Ordering;

        if in_check {
            let ord = b.resolves_check.cmp(&a.resolves_check);
            if ord != Ordering::Equal {
                return ord;
            }
            if a.resolves_check && b.resolves_check {
                let ord = b.captures_attacker.cmp(&a.captures_attacker);
                if ord != Ordering::Equal {
                    return ord;
                }
                // King moves are the safer resolution; try them next.
                let a_king = moves_king(board, a.from);
                let b_king = moves_king(board, b.from);
                let ord = b_king.cmp(&a_king);
                if ord != Ordering::Equal {
                    return ord;
                }
                let ord = b.blocks_check.cmp(&a.blocks_check);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }

        b.score.cmp(&a.score)
    });

    moves
}

fn moves_king(board: &Board, from: Square) -> bool {
    board
        .piece_at(from)
        .map(|p| p.piece_type == PieceType::King)
        .unwrap_or(false)
}

/// Strict betweenness on a shared rank, file, or diagonal — the squares
/// where a piece can interpose against a sliding checker.
fn is_between(pos: Square, king: Square, attacker: Square) -> bool {
    // Shared rank
    if king.0 == attacker.0 && pos.0 == king.0 {
        let (lo, hi) = (king.1.min(attacker.1), king.1.max(attacker.1));
        return pos.1 > lo && pos.1 < hi;
    }

    // Shared file
    if king.1 == attacker.1 && pos.1 == king.1 {
        let (lo, hi) = (king.0.min(attacker.0), king.0.max(attacker.0));
        return pos.0 > lo && pos.0 < hi;
    }

    // Shared diagonal
    let dr = attacker.0 as i32 - king.0 as i32;
    let dc = attacker.1 as i32 - king.1 as i32;
    if dr.abs() == dc.abs() && dr != 0 {
        let (step_r, step_c) = (dr.signum(), dc.signum());
        let mut r = king.0 as i32 + step_r;
        let mut c = king.1 as i32 + step_c;
        while (r, c) != (attacker.0 as i32, attacker.1 as i32) {
            if (r as usize, c as usize) == pos {
                return true;
            }
            r += step_r;
            c += step_c;
        }
    }

    false
}

// =============================================================================
// Search
// =============================================================================

/// The outcome of a search: the minimax score and, for interior calls with
/// at least one move, the move that achieves it.
#[derive(Clone, Copy, Debug)]
pub struct SearchResult {
    pub score: i32,
    pub best: Option<(Square, Square)>,
}

/// Minimax with alpha-beta pruning. `maximizing` is true when `ai` is the
/// side to move; leaves are evaluated from `ai`'s perspective regardless of
/// whose turn it is. Checkmate short-circuits to ±`MATE_SCORE` and
/// stalemate to 0 before any evaluation. Each speculative move is appended
/// to a copy of the history so en passant stays correct down the line.
pub fn minimax(
    board: &Board,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    ai: Color,
    history: &[MoveRecord],
) -> SearchResult {
    if depth == 0 {
        return SearchResult {
            score: evaluate(board, ai),
            best: None,
        };
    }

    let color = if maximizing { ai } else { ai.opposite() };

    match game_status(board, color, history) {
        GameStatus::Checkmate => {
            // The side to move is mated: catastrophic when it is the AI,
            // a won line otherwise.
            return SearchResult {
                score: if maximizing { -MATE_SCORE } else { MATE_SCORE },
                best: None,
            };
        }
        GameStatus::Stalemate => {
            return SearchResult { score: 0, best: None };
        }
        GameStatus::Active | GameStatus::Check => {}
    }

    let moves = all_moves(board, color, history);

    let mut best = SearchResult {
        score: if maximizing { i32::MIN } else { i32::MAX },
        best: None,
    };

    for m in &moves {
        let (next, record) = match apply_move(board, m.from, m.to, history) {
            Some(outcome) => outcome,
            None => continue,
        };
        let mut extended = history.to_vec();
        extended.push(record);

        let result = minimax(&next, depth - 1, alpha, beta, !maximizing, ai, &extended);

        if maximizing {
            if result.score > best.score {
                best = SearchResult {
                    score: result.score,
                    best: Some((m.from, m.to)),
                };
            }
            alpha = alpha.max(best.score);
        } else {
            if result.score < best.score {
                best = SearchResult {
                    score: result.score,
                    best: Some((m.from, m.to)),
                };
            }
            beta = beta.min(best.score);
        }

        if beta <= alpha {
            break;
        }
    }

    best
}

// =============================================================================
// Entry points
// =============================================================================

/// Pick a move for the automated side, or `None` when it has no legal move.
///
/// When in check, the prioritizer's ordering already puts the strongest
/// resolution first, so that move is played directly; otherwise run the
/// full search at `depth` plies.
pub fn best_move(
    board: &Board,
    color: Color,
    depth: u32,
    history: &[MoveRecord],
) -> Option<(Square, Square)> {
    let moves = all_moves(board, color, history);
    let first = moves.first().map(|m| (m.from, m.to))?;

    if board.is_in_check(color) {
        return Some(first);
    }

    let result = minimax(board, depth, i32::MIN, i32::MAX, true, color, history);
    result.best.or(Some(first))
}

/// The highest-scoring legal move for white by static ranking, no recursive
/// search. Backs the shell's "suggest a move" feature.
pub fn suggest_move(board: &Board, history: &[MoveRecord]) -> Option<(Square, Square)> {
    all_moves(board, Color::White, history)
        .first()
        .map(|m| (m.from, m.to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    fn kings_at(white: Square, black: Square) -> Board {
        let mut board = Board::empty();
        board.place(white, Piece::new(PieceType::King, Color::White));
        board.place(black, Piece::new(PieceType::King, Color::Black));
        board
    }

    /// White rook on a1, black queen hanging on a8.
    fn hanging_queen_board() -> Board {
        let mut board = kings_at((7, 4), (0, 4));
        board.place((7, 0), Piece::new(PieceType::Rook, Color::White));
        board.place((0, 0), Piece::new(PieceType::Queen, Color::Black));
        board
    }

    #[test]
    fn material_eval_counts_pieces() {
        let mut board = kings_at((7, 4), (0, 4));
        board.place((7, 3), Piece::new(PieceType::Queen, Color::White));

        assert!(evaluate(&board, Color::White) > 0);
        assert!(evaluate(&board, Color::Black) < 0);
    }

    #[test]
    fn advanced_pawn_outscores_home_pawn() {
        let mut home = kings_at((7, 4), (0, 4));
        home.place((6, 0), Piece::new(PieceType::Pawn, Color::White));
        let mut advanced = kings_at((7, 4), (0, 4));
        advanced.place((1, 0), Piece::new(PieceType::Pawn, Color::White));

        assert!(
            evaluate(&advanced, Color::White) > evaluate(&home, Color::White),
            "seventh-rank pawn should outscore a home pawn"
        );
    }

    #[test]
    fn giving_check_is_worth_the_bonus() {
        let mut checking = kings_at((7, 0), (0, 4));
        checking.place((4, 4), Piece::new(PieceType::Rook, Color::White));
        let mut quiet = kings_at((7, 0), (0, 4));
        quiet.place((4, 3), Piece::new(PieceType::Rook, Color::White));

        assert_eq!(
            evaluate(&checking, Color::White) - evaluate(&quiet, Color::White),
            150,
            "same material, check term only"
        );
    }

    #[test]
    fn ordering_without_check_is_by_descending_score() {
        let moves = all_moves(&hanging_queen_board(), Color::White, &[]);
        assert!(!moves.is_empty());
        for pair in moves.windows(2) {
            assert!(
                pair[0].score >= pair[1].score,
                "scores must be non-increasing: {} then {}",
                pair[0].score,
                pair[1].score
            );
        }
        assert_eq!((moves[0].from, moves[0].to), ((7, 0), (0, 0)), "queen capture ranks first");
    }

    #[test]
    fn check_resolution_ordering_prefers_captures_then_king_then_blocks() {
        // Black rook on e4 checks the white king on e1. A white knight can
        // capture it, the king can step aside, a white rook can interpose
        // on e3.
        let mut board = kings_at((7, 4), (0, 0));
        board.place((4, 4), Piece::new(PieceType::Rook, Color::Black));
        board.place((2, 3), Piece::new(PieceType::Knight, Color::White));
        board.place((5, 0), Piece::new(PieceType::Rook, Color::White));

        assert!(board.is_in_check(Color::White));
        let moves = all_moves(&board, Color::White, &[]);

        assert!(moves[0].captures_attacker, "capture of the checker first: {moves:?}");
        assert_eq!((moves[0].from, moves[0].to), ((2, 3), (4, 4)));

        let block_idx = moves
            .iter()
            .position(|m| m.blocks_check)
            .expect("rook interposition should be present");
        for (idx, m) in moves.iter().enumerate() {
            if moves_king(&board, m.from) {
                assert!(idx < block_idx, "king moves come before interpositions");
            }
        }
        assert!(moves.iter().all(|m| m.resolves_check), "every legal reply resolves the check");
    }

    #[test]
    fn interposition_detected_on_file_rank_and_diagonal() {
        assert!(is_between((5, 4), (7, 4), (4, 4)), "file");
        assert!(!is_between((3, 4), (7, 4), (4, 4)), "beyond the attacker");
        assert!(is_between((4, 3), (4, 0), (4, 6)), "rank");
        assert!(is_between((5, 5), (7, 7), (3, 3)), "diagonal");
        assert!(!is_between((5, 6), (7, 7), (3, 3)), "off the diagonal");
    }

    /// Depth-1 search must pick a move whose static outcome is at least as
    /// good as every alternative's.
    #[test]
    fn depth_one_search_is_greedy_optimal() {
        let board = hanging_queen_board();
        let (from, to) = best_move(&board, Color::White, 1, &[]).expect("white has moves");
        assert_eq!((from, to), ((7, 0), (0, 0)), "rook takes the hanging queen");

        let (chosen, _) = apply_move(&board, from, to, &[]).unwrap();
        let chosen_score = evaluate(&chosen, Color::White);
        for m in all_moves(&board, Color::White, &[]) {
            let (next, _) = apply_move(&board, m.from, m.to, &[]).unwrap();
            assert!(
                chosen_score >= evaluate(&next, Color::White),
                "{:?}->{:?} outscores the chosen move",
                m.from,
                m.to
            );
        }
    }

    #[test]
    fn search_finds_back_rank_mate() {
        // Ra5-a8 is mate with the second rook sealing the seventh rank.
        let mut board = kings_at((7, 4), (0, 7));
        board.place((4, 0), Piece::new(PieceType::Rook, Color::White));
        board.place((1, 1), Piece::new(PieceType::Rook, Color::White));

        let result = minimax(&board, 2, i32::MIN, i32::MAX, true, Color::White, &[]);
        assert_eq!(result.best, Some(((4, 0), (0, 0))));
        assert_eq!(result.score, 10_000, "mate dominates any material score");
    }

    #[test]
    fn in_check_shortcut_plays_the_top_ranked_resolution() {
        let mut board = kings_at((7, 4), (0, 0));
        board.place((4, 4), Piece::new(PieceType::Rook, Color::Black));
        board.place((2, 3), Piece::new(PieceType::Knight, Color::White));

        let moves = all_moves(&board, Color::White, &[]);
        let picked = best_move(&board, Color::White, 3, &[]).unwrap();
        assert_eq!(picked, (moves[0].from, moves[0].to));
        assert_eq!(picked, ((2, 3), (4, 4)), "knight captures the checking rook");
    }

    #[test]
    fn best_move_is_none_when_mated() {
        let mut mated = kings_at((7, 4), (0, 4));
        mated.place((1, 3), Piece::new(PieceType::Pawn, Color::Black));
        mated.place((1, 4), Piece::new(PieceType::Pawn, Color::Black));
        mated.place((1, 5), Piece::new(PieceType::Pawn, Color::Black));
        mated.place((0, 0), Piece::new(PieceType::Queen, Color::White));

        assert!(best_move(&mated, Color::Black, 2, &[]).is_none());
    }

    #[test]
    fn suggest_move_matches_static_ranking() {
        let board = hanging_queen_board();
        let suggested = suggest_move(&board, &[]).expect("white has moves");
        assert_eq!(suggested, ((7, 0), (0, 0)));

        let top = all_moves(&board, Color::White, &[]);
        assert_eq!(suggested, (top[0].from, top[0].to));
    }

    /// Reference minimax without pruning. Pruning may only change how many
    /// nodes get visited, never the returned score.
    fn full_minimax(
        board: &Board,
        depth: u32,
        maximizing: bool,
        ai: Color,
        history: &[MoveRecord],
    ) -> i32 {
        if depth == 0 {
            return evaluate(board, ai);
        }
        let color = if maximizing { ai } else { ai.opposite() };
        match game_status(board, color, history) {
            GameStatus::Checkmate => {
                return if maximizing { -MATE_SCORE } else { MATE_SCORE };
            }
            GameStatus::Stalemate => return 0,
            GameStatus::Active | GameStatus::Check => {}
        }

        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for m in all_moves(board, color, history) {
            let (next, record) = apply_move(board, m.from, m.to, history).unwrap();
            let mut extended = history.to_vec();
            extended.push(record);
            let score = full_minimax(&next, depth - 1, !maximizing, ai, &extended);
            best = if maximizing {
                best.max(score)
            } else {
                best.min(score)
            };
        }
        best
    }

    #[test]
    fn pruned_search_matches_full_minimax() {
        // A tactically live middlegame-ish position rather than a bare one.
        let mut board = kings_at((7, 4), (0, 4));
        board.place((4, 3), Piece::new(PieceType::Rook, Color::White));
        board.place((3, 5), Piece::new(PieceType::Knight, Color::White));
        board.place((6, 2), Piece::new(PieceType::Pawn, Color::White));
        board.place((2, 2), Piece::new(PieceType::Bishop, Color::Black));
        board.place((1, 6), Piece::new(PieceType::Pawn, Color::Black));
        board.place((3, 0), Piece::new(PieceType::Rook, Color::Black));

        for depth in [1, 2] {
            let pruned = minimax(&board, depth, i32::MIN, i32::MAX, true, Color::White, &[]);
            let full = full_minimax(&board, depth, true, Color::White, &[]);
            assert_eq!(pruned.score, full, "pruning changed the value at depth {depth}");
        }
    }
}
