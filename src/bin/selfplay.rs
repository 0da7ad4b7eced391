use rand::seq::SliceRandom;

use chess_core::board::Board;
use chess_core::engine::{all_moves, best_move};
use chess_core::moves::{square_to_coord, MoveRecord, Square};
use chess_core::piece::Color;
use chess_core::rules::{apply_move, game_status, GameStatus};

const DEPTH: u32 = 2;
const MAX_PLIES: usize = 120;

fn main() {
    let mut board = Board::new();
    let mut history: Vec<MoveRecord> = Vec::new();
    let mut to_move = Color::White;

    // Randomize white's opening so repeated runs explore different games.
    let opening = {
        let candidates = all_moves(&board, Color::White, &history);
        let mut rng = rand::thread_rng();
        candidates
            .choose(&mut rng)
            .map(|m| (m.from, m.to))
            .expect("white has an opening move")
    };
    play(&mut board, &mut history, opening);
    to_move = to_move.opposite();

    while history.len() < MAX_PLIES {
        match game_status(&board, to_move, &history) {
            GameStatus::Active | GameStatus::Check => {}
            terminal => {
                eprintln!("{terminal:?} after {} plies", history.len());
                return;
            }
        }

        match best_move(&board, to_move, DEPTH, &history) {
            Some(mv) => play(&mut board, &mut history, mv),
            None => break,
        }
        to_move = to_move.opposite();
    }

    let status = game_status(&board, to_move, &history);
    eprintln!("{status:?} after {} plies", history.len());
}

fn play(board: &mut Board, history: &mut Vec<MoveRecord>, (from, to): (Square, Square)) {
    let (next, record) = apply_move(board, from, to, history).expect("engine produced a legal move");
    println!(
        "{} {} {}",
        square_to_coord(from),
        square_to_coord(to),
        serde_json::to_string(&record).expect("move record serializes")
    );
    *board = next;
    history.push(record);
}
