//! Move legality and generation.
//!
//! Pieces only ever make two kinds of move: out of a room into a free,
//! non-doorway corridor cell, or from the corridor straight into their own
//! room once it holds nothing but their own species. Corridor-to-corridor
//! and room-to-room moves are never generated.

use smallvec::SmallVec;

use crate::board::{doorway, is_doorway, Board, Move, Position, Species, CORRIDOR_LEN, ROOMS};

/// Candidate moves from one board
pub type MoveList = SmallVec<[Move; 32]>;

/// Every legal single-piece move from `board`.
///
/// Corridor-to-home moves come first, then room exits room by room with the
/// leftward cells before the rightward ones.
pub fn legal_moves<const D: usize>(board: &Board<D>) -> MoveList {
    let mut moves = MoveList::new();
    corridor_to_home(board, &mut moves);
    room_to_corridor(board, &mut moves);
    moves
}

fn corridor_to_home<const D: usize>(board: &Board<D>, moves: &mut MoveList) {
    for (cell, occupant) in board.corridor().iter().enumerate() {
        let Some(species) = *occupant else {
            continue;
        };

        let door = species.doorway();
        if !corridor_clear(board, cell, door) {
            continue;
        }
        let Some(depth) = home_slot(board, species) else {
            continue;
        };

        let steps = cell.abs_diff(door) + depth + 1;
        moves.push(Move::new(
            species,
            Position::Corridor { cell },
            Position::Room {
                room: species.home(),
                depth,
            },
            steps as u32,
        ));
    }
}

fn room_to_corridor<const D: usize>(board: &Board<D>, moves: &mut MoveList) {
    for room in 0..ROOMS {
        let cells = board.room(room);
        let Some((depth, species)) = cells
            .iter()
            .enumerate()
            .find_map(|(depth, cell)| cell.map(|species| (depth, species)))
        else {
            continue;
        };

        if is_settled(cells, room, depth) {
            continue;
        }

        let from = Position::Room { room, depth };
        let door = doorway(room);
        let exit = depth + 1;
        push_exits(board, species, from, exit, door, (0..door).rev(), moves);
        push_exits(board, species, from, exit, door, door + 1..CORRIDOR_LEN, moves);
    }
}

/// Emit a move to every free non-doorway cell along `cells`, stopping at the
/// first occupied one.
fn push_exits<const D: usize>(
    board: &Board<D>,
    species: Species,
    from: Position,
    exit: usize,
    door: usize,
    cells: impl Iterator<Item = usize>,
    moves: &mut MoveList,
) {
    let corridor = board.corridor();
    for cell in cells
        .take_while(|&cell| corridor[cell].is_none())
        .filter(|&cell| !is_doorway(cell))
    {
        let steps = exit + cell.abs_diff(door);
        moves.push(Move::new(
            species,
            from,
            Position::Corridor { cell },
            steps as u32,
        ));
    }
}

/// Corridor cells after `from` up to and including `to` are all free.
fn corridor_clear<const D: usize>(board: &Board<D>, from: usize, to: usize) -> bool {
    let corridor = board.corridor();
    let between = if from < to {
        &corridor[from + 1..=to]
    } else {
        &corridor[to..from]
    };
    between.iter().all(Option::is_none)
}

/// Deepest free cell of the species' home room, provided the room holds no
/// other species.
fn home_slot<const D: usize>(board: &Board<D>, species: Species) -> Option<usize> {
    let cells = board.room(species.home());
    if cells.iter().flatten().any(|&other| other != species) {
        return None;
    }
    cells.iter().rposition(Option::is_none)
}

/// The piece at `depth` and everything below it already belong in `room`.
fn is_settled<const D: usize>(cells: &[Option<Species>; D], room: usize, depth: usize) -> bool {
    cells[depth..]
        .iter()
        .all(|cell| cell.is_some_and(|species| species.home() == room))
}
