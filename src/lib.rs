pub mod board;
pub mod engine;
pub mod moves;
pub mod piece;
pub mod rules;
