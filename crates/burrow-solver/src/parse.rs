//! Reading burrows from text diagrams and JSON.
//!
//! Diagrams look like the ones the puzzle prints:
//!
//! ```text
//! #############
//! #...........#
//! ###B#C#B#D###
//!   #A#D#C#A#
//!   #########
//! ```
//!
//! The first non-wall row is the corridor; every following non-wall row is
//! one level of the rooms, read at columns 3, 5, 7 and 9.

use crate::board::{Layout, Species, CORRIDOR_LEN, ROOMS};
use crate::error::BoardError;

/// Columns holding the room cells in a diagram row
const ROOM_COLUMNS: [usize; ROOMS] = [3, 5, 7, 9];

/// Rows inserted by [`unfold`], top to bottom
const FOLDED_ROWS: [[Species; ROOMS]; 2] = [
    [Species::D, Species::C, Species::B, Species::A],
    [Species::D, Species::B, Species::A, Species::C],
];

/// Parse a text diagram into a layout.
pub fn parse_diagram(input: &str) -> Result<Layout, BoardError> {
    let mut corridor = None;
    let mut rows: Vec<[Option<Species>; ROOMS]> = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let chars: Vec<char> = line.trim_end().chars().collect();
        if chars.iter().all(|&c| c == '#' || c == ' ') {
            continue;
        }

        let cell_at = |column: usize| -> Result<Option<Species>, BoardError> {
            let ch = *chars.get(column).ok_or(BoardError::ShortLine(line_number))?;
            parse_cell(ch).ok_or(BoardError::UnexpectedChar {
                line: line_number,
                column,
                ch,
            })
        };

        if corridor.is_none() {
            let cells = (1..=CORRIDOR_LEN)
                .map(cell_at)
                .collect::<Result<Vec<_>, _>>()?;
            corridor = Some(cells);
        } else {
            let mut row = [None; ROOMS];
            for (room, &column) in ROOM_COLUMNS.iter().enumerate() {
                row[room] = cell_at(column)?;
            }
            rows.push(row);
        }
    }

    let corridor = corridor.ok_or(BoardError::MissingCorridor)?;
    if rows.is_empty() {
        return Err(BoardError::NoRooms);
    }

    let rooms = (0..ROOMS)
        .map(|room| rows.iter().map(|row| row[room]).collect())
        .collect();
    Ok(Layout { corridor, rooms })
}

fn parse_cell(ch: char) -> Option<Option<Species>> {
    match ch {
        '.' => Some(None),
        letter => Species::from_letter(letter).map(Some),
    }
}

/// Insert the two hidden rows between the first and second room levels,
/// turning a depth-2 burrow into its depth-4 variant.
pub fn unfold(layout: &Layout) -> Layout {
    let mut unfolded = layout.clone();
    for (room, cells) in unfolded.rooms.iter_mut().enumerate() {
        let at = cells.len().min(1);
        for (offset, row) in FOLDED_ROWS.iter().enumerate() {
            cells.insert(at + offset, row.get(room).copied());
        }
    }
    unfolded
}

/// Parse a JSON layout such as `{"rooms": [["B", "A"], ["C", "D"], ...]}`.
pub fn parse_json(input: &str) -> serde_json::Result<Layout> {
    serde_json::from_str(input)
}
