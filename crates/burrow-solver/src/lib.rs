//! Branch-and-bound solver for the amphipod burrow puzzle.
//!
//! Four species of piece start shuffled across four rooms and must be
//! sorted, one species per room, by walking them through a shared corridor.
//! Moving costs energy per step, ten times more for each species. This
//! crate finds the cheapest complete sort with a depth-first search that
//! prunes on the best solution found so far.

pub mod board;
pub mod error;
pub mod moves;
pub mod parse;
pub mod pruning;
pub mod solver;

// Re-export main types
pub use board::{Board, Layout, Move, Position, Species};
pub use error::{BoardError, SearchError};
pub use moves::legal_moves;
pub use parse::{parse_diagram, parse_json, unfold};
pub use solver::{solve, Outcome, SearchConfig, SearchResult, SearchStats, Solution};
