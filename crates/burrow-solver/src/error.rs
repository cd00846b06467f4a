//! Error types for board construction and search.

use thiserror::Error;

use crate::board::Species;

/// Problems with an input board or diagram.
///
/// These are recoverable: they describe bad input, not a bug in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("expected 4 rooms, found {0}")]
    RoomCount(usize),

    #[error("room {room} has depth {found}, expected {expected}")]
    RoomDepth {
        room: usize,
        expected: usize,
        found: usize,
    },

    #[error("corridor has {0} cells, expected 11")]
    CorridorLength(usize),

    #[error("found {found} pieces of species {species}, expected {expected}")]
    PieceCount {
        species: Species,
        expected: usize,
        found: usize,
    },

    #[error("piece resting on doorway cell {0}")]
    Doorway(usize),

    #[error("room {room} has an empty cell at depth {depth} below an occupied cell")]
    Gap { room: usize, depth: usize },

    #[error("unexpected character {ch:?} at line {line}, column {column}")]
    UnexpectedChar {
        line: usize,
        column: usize,
        ch: char,
    },

    #[error("line {0} is too short")]
    ShortLine(usize),

    #[error("diagram has no corridor row")]
    MissingCorridor,

    #[error("diagram has no room rows")]
    NoRooms,

    #[error("unsupported room depth {0}")]
    UnsupportedDepth(usize),
}

/// Internal defects detected during the search.
///
/// A board that passed validation never produces one of these; seeing one
/// means move application broke an invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("board corrupted: {found} pieces of species {species}, expected {expected}")]
    CorruptedBoard {
        species: Species,
        expected: usize,
        found: usize,
    },
}
