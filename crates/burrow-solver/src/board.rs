//! Burrow representation: species, positions, moves and board state.
//!
//! A burrow has four rooms of fixed depth `D` hanging below an 11-cell
//! corridor. Room cells are indexed from the opening (depth 0) down to the
//! closed end (depth `D - 1`). Corridor cells 2, 4, 6 and 8 sit in front of
//! the room openings and are never resting positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, SearchError};

/// Number of cells in the corridor
pub const CORRIDOR_LEN: usize = 11;

/// Number of rooms, one per species
pub const ROOMS: usize = 4;

/// Corridor cell directly in front of a room's opening.
pub const fn doorway(room: usize) -> usize {
    2 + 2 * room
}

/// Whether a corridor cell sits in front of a room opening.
pub const fn is_doorway(cell: usize) -> bool {
    matches!(cell, 2 | 4 | 6 | 8)
}

/// The four kinds of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    A,
    B,
    C,
    D,
}

impl Species {
    pub const ALL: [Species; ROOMS] = [Species::A, Species::B, Species::C, Species::D];

    /// Energy spent per step
    pub fn step_cost(self) -> u32 {
        match self {
            Species::A => 1,
            Species::B => 10,
            Species::C => 100,
            Species::D => 1000,
        }
    }

    /// Index of the room this species belongs in
    pub fn home(self) -> usize {
        self as usize
    }

    /// Corridor cell in front of the home room
    pub fn doorway(self) -> usize {
        doorway(self.home())
    }

    pub fn from_letter(letter: char) -> Option<Species> {
        match letter {
            'A' => Some(Species::A),
            'B' => Some(Species::B),
            'C' => Some(Species::C),
            'D' => Some(Species::D),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Species::A => 'A',
            Species::B => 'B',
            Species::C => 'C',
            Species::D => 'D',
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A cell of the burrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Position {
    Corridor { cell: usize },
    Room { room: usize, depth: usize },
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Position::Corridor { cell } => write!(f, "corridor {cell}"),
            Position::Room { room, depth } => {
                write!(f, "room {}[{depth}]", Species::ALL[room].letter())
            }
        }
    }
}

/// A single piece movement with its step count and energy cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub species: Species,
    pub from: Position,
    pub to: Position,
    pub steps: u32,
    pub cost: u32,
}

impl Move {
    pub fn new(species: Species, from: Position, to: Position, steps: u32) -> Self {
        Self {
            species,
            from,
            to,
            steps,
            cost: steps * species.step_cost(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} ({} steps, cost {})",
            self.species, self.from, self.to, self.steps, self.cost
        )
    }
}

/// Board state at one point of the search, plus the moves that led here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board<const D: usize> {
    rooms: [[Option<Species>; D]; ROOMS],
    corridor: [Option<Species>; CORRIDOR_LEN],
    log: Vec<Move>,
}

impl<const D: usize> Board<D> {
    /// Board with full rooms and an empty corridor. Not validated.
    pub fn from_rooms(rooms: [[Species; D]; ROOMS]) -> Self {
        Self::from_cells(rooms.map(|room| room.map(Some)), [None; CORRIDOR_LEN])
    }

    /// Board from raw cell contents. Not validated.
    pub fn from_cells(
        rooms: [[Option<Species>; D]; ROOMS],
        corridor: [Option<Species>; CORRIDOR_LEN],
    ) -> Self {
        Self {
            rooms,
            corridor,
            log: Vec::new(),
        }
    }

    /// The sorted board
    pub fn solved() -> Self {
        Self::from_rooms(Species::ALL.map(|species| [species; D]))
    }

    pub fn room(&self, room: usize) -> &[Option<Species>; D] {
        &self.rooms[room]
    }

    pub fn corridor(&self) -> &[Option<Species>; CORRIDOR_LEN] {
        &self.corridor
    }

    /// Moves applied since the initial board
    pub fn log(&self) -> &[Move] {
        &self.log
    }

    /// Occupant of a cell
    pub fn at(&self, position: Position) -> Option<Species> {
        match position {
            Position::Corridor { cell } => self.corridor[cell],
            Position::Room { room, depth } => self.rooms[room][depth],
        }
    }

    fn cell_mut(&mut self, position: Position) -> &mut Option<Species> {
        match position {
            Position::Corridor { cell } => &mut self.corridor[cell],
            Position::Room { room, depth } => &mut self.rooms[room][depth],
        }
    }

    /// Energy spent so far, summed from the move log
    pub fn total_cost(&self) -> u32 {
        self.log.iter().map(|m| m.cost).sum()
    }

    /// Corridor empty and every room filled with its own species.
    pub fn is_solved(&self) -> bool {
        self.corridor.iter().all(Option::is_none)
            && self.rooms.iter().enumerate().all(|(room, cells)| {
                cells
                    .iter()
                    .all(|cell| cell.is_some_and(|species| species.home() == room))
            })
    }

    fn counts(&self) -> [usize; ROOMS] {
        let mut counts = [0; ROOMS];
        for species in self.corridor.iter().chain(self.rooms.iter().flatten()).flatten() {
            counts[species.home()] += 1;
        }
        counts
    }

    /// Verify that exactly `D` pieces of each species are on the board.
    pub fn check_counts(&self) -> Result<(), SearchError> {
        let counts = self.counts();
        for species in Species::ALL {
            let found = counts[species.home()];
            if found != D {
                return Err(SearchError::CorruptedBoard {
                    species,
                    expected: D,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Copy of this board with the move applied and logged.
    pub fn apply(&self, mv: &Move) -> Self {
        let mut next = self.clone();
        let piece = next.cell_mut(mv.from).take();
        *next.cell_mut(mv.to) = piece;
        next.log.push(*mv);
        next
    }

    /// Every board visited while applying `moves` in order, starting with
    /// this one.
    pub fn replay(&self, moves: &[Move]) -> Vec<Self> {
        let mut boards = Vec::with_capacity(moves.len() + 1);
        boards.push(self.clone());
        for mv in moves {
            let next = boards[boards.len() - 1].apply(mv);
            boards.push(next);
        }
        boards
    }

    /// Compact encoding of the cell contents (the log is ignored).
    ///
    /// Three bits per cell, so this is exact for depths up to 7.
    pub fn key(&self) -> u128 {
        self.corridor
            .iter()
            .chain(self.rooms.iter().flatten())
            .fold(0u128, |acc, cell| {
                (acc << 3) | cell.map_or(0, |species| species.home() as u128 + 1)
            })
    }

    pub fn to_layout(&self) -> Layout {
        Layout {
            corridor: self.corridor.to_vec(),
            rooms: self.rooms.iter().map(|room| room.to_vec()).collect(),
        }
    }
}

impl<const D: usize> fmt::Display for Board<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyph = |cell: Option<Species>| cell.map_or('.', Species::letter);

        writeln!(f, "#############")?;
        let corridor: String = self.corridor.iter().map(|&cell| glyph(cell)).collect();
        writeln!(f, "#{corridor}#")?;
        for depth in 0..D {
            let [a, b, c, d] = [0, 1, 2, 3].map(|room| glyph(self.rooms[room][depth]));
            if depth == 0 {
                writeln!(f, "###{a}#{b}#{c}#{d}###")?;
            } else {
                writeln!(f, "  #{a}#{b}#{c}#{d}#")?;
            }
        }
        write!(f, "  #########")
    }
}

/// Depth-agnostic description of a burrow, used as the input format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Corridor contents; empty means an empty corridor
    #[serde(default)]
    pub corridor: Vec<Option<Species>>,
    /// Room contents from opening to closed end
    pub rooms: Vec<Vec<Option<Species>>>,
}

impl Layout {
    pub fn depth(&self) -> usize {
        self.rooms.first().map_or(0, Vec::len)
    }
}

impl<const D: usize> TryFrom<&Layout> for Board<D> {
    type Error = BoardError;

    fn try_from(layout: &Layout) -> Result<Self, Self::Error> {
        if layout.rooms.len() != ROOMS {
            return Err(BoardError::RoomCount(layout.rooms.len()));
        }

        let mut rooms = [[None; D]; ROOMS];
        for (room, cells) in layout.rooms.iter().enumerate() {
            if cells.len() != D {
                return Err(BoardError::RoomDepth {
                    room,
                    expected: D,
                    found: cells.len(),
                });
            }
            for depth in 1..D {
                if cells[depth].is_none() && cells[depth - 1].is_some() {
                    return Err(BoardError::Gap { room, depth });
                }
            }
            rooms[room].copy_from_slice(cells);
        }

        let mut corridor = [None; CORRIDOR_LEN];
        match layout.corridor.len() {
            0 => {}
            CORRIDOR_LEN => corridor.copy_from_slice(&layout.corridor),
            n => return Err(BoardError::CorridorLength(n)),
        }
        if let Some(cell) = (0..CORRIDOR_LEN).find(|&c| is_doorway(c) && corridor[c].is_some()) {
            return Err(BoardError::Doorway(cell));
        }

        let board = Board::from_cells(rooms, corridor);
        let counts = board.counts();
        for species in Species::ALL {
            let found = counts[species.home()];
            if found != D {
                return Err(BoardError::PieceCount {
                    species,
                    expected: D,
                    found,
                });
            }
        }
        Ok(board)
    }
}
