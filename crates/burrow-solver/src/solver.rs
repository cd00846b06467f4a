//! Depth-first branch-and-bound search for the cheapest way to sort a burrow.
//!
//! Every node owns its own board; children are fresh copies with one move
//! applied. The only state shared between branches is the incumbent bound,
//! which lives in an atomic so the first level of the tree can be fanned
//! out over rayon workers.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::board::{Board, Move};
use crate::error::SearchError;
use crate::moves::{legal_moves, MoveList};
use crate::pruning::{Incumbent, TranspositionTable};

/// Nodes between two deadline checks
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Configuration for the search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Drop branches that already cost as much as the best solution
    pub bound_pruning: bool,
    /// Drop branches that reach a known layout at no lower cost
    pub transposition: bool,
    /// Explore each first move on its own worker
    pub parallel: bool,
    /// Stop searching after this long
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            bound_pruning: true,
            transposition: true,
            parallel: false,
            timeout: None,
        }
    }
}

/// A complete move sequence that sorts the burrow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub cost: u32,
    pub moves: Vec<Move>,
}

/// How the search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The tree was exhausted; this solution is optimal
    Solved(Solution),
    /// The tree was exhausted without reaching a sorted board
    Unsolvable,
    /// The search stopped early; `best` is not known to be optimal
    Undetermined { best: Option<Solution> },
}

impl Outcome {
    /// Best solution found, proven optimal or not
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Solved(solution) => Some(solution),
            Outcome::Unsolvable => None,
            Outcome::Undetermined { best } => best.as_ref(),
        }
    }

    pub fn cost(&self) -> Option<u32> {
        self.solution().map(|s| s.cost)
    }
}

/// Counters collected while searching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub nodes_evaluated: u64,
    pub pruned_by_bound: u64,
    pub pruned_by_transposition: u64,
    pub dead_ends: u64,
    pub solutions_found: u64,
}

impl SearchStats {
    fn absorb(&mut self, other: &SearchStats) {
        self.nodes_evaluated += other.nodes_evaluated;
        self.pruned_by_bound += other.pruned_by_bound;
        self.pruned_by_transposition += other.pruned_by_transposition;
        self.dead_ends += other.dead_ends;
        self.solutions_found += other.solutions_found;
    }
}

/// Result of a search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub outcome: Outcome,
    pub stats: SearchStats,
    /// Time elapsed in milliseconds
    pub time_elapsed_ms: u64,
}

/// Search state owned by one worker
struct SearchContext<'a> {
    config: &'a SearchConfig,
    incumbent: &'a Incumbent,
    deadline: Option<Instant>,
    table: TranspositionTable,
    best: Option<Solution>,
    stats: SearchStats,
    timed_out: bool,
}

impl<'a> SearchContext<'a> {
    fn new(config: &'a SearchConfig, incumbent: &'a Incumbent, deadline: Option<Instant>) -> Self {
        Self {
            config,
            incumbent,
            deadline,
            table: TranspositionTable::new(),
            best: None,
            stats: SearchStats::default(),
            timed_out: false,
        }
    }

    /// Recursively explore everything below `board`.
    fn evaluate<const D: usize>(&mut self, board: &Board<D>) -> Result<(), SearchError> {
        let Some(moves) = self.expand(board)? else {
            return Ok(());
        };
        for mv in &moves {
            if self.timed_out {
                break;
            }
            self.evaluate(&board.apply(mv))?;
        }
        Ok(())
    }

    /// Classify a node. Returns the moves to branch on, or `None` when the
    /// node is a leaf (solved, pruned, dead end or out of time).
    fn expand<const D: usize>(&mut self, board: &Board<D>) -> Result<Option<MoveList>, SearchError> {
        board.check_counts()?;

        if self.stats.nodes_evaluated % DEADLINE_CHECK_INTERVAL == 0
            && self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.timed_out = true;
            return Ok(None);
        }
        self.stats.nodes_evaluated += 1;

        let cost = board.total_cost();
        trace!(event = "node", cost, depth = board.log().len());

        if board.is_solved() {
            self.record(board, cost);
            return Ok(None);
        }

        if self.config.bound_pruning && self.incumbent.exceeded_by(cost) {
            self.stats.pruned_by_bound += 1;
            return Ok(None);
        }

        if self.config.transposition && self.table.revisit(board.key(), cost) {
            self.stats.pruned_by_transposition += 1;
            return Ok(None);
        }

        let moves = legal_moves(board);
        if moves.is_empty() {
            self.stats.dead_ends += 1;
            return Ok(None);
        }
        Ok(Some(moves))
    }

    fn record<const D: usize>(&mut self, board: &Board<D>, cost: u32) {
        self.stats.solutions_found += 1;
        if self.incumbent.offer(cost) {
            debug!(event = "new_best", cost, moves = board.log().len());
            self.best = Some(Solution {
                cost,
                moves: board.log().to_vec(),
            });
        }
    }

    /// Fold a finished worker's findings into this context.
    fn absorb(&mut self, other: SearchContext<'_>) {
        self.stats.absorb(&other.stats);
        self.timed_out |= other.timed_out;
        if let Some(theirs) = other.best {
            if self.best.as_ref().map_or(true, |ours| theirs.cost < ours.cost) {
                self.best = Some(theirs);
            }
        }
    }

    fn into_outcome(self) -> Outcome {
        match (self.timed_out, self.best) {
            (true, best) => Outcome::Undetermined { best },
            (false, Some(solution)) => Outcome::Solved(solution),
            (false, None) => Outcome::Unsolvable,
        }
    }
}

/// Find the cheapest sequence of moves that sorts `board`.
///
/// Fails only if the engine corrupts a board, which signals a bug rather
/// than bad input.
pub fn solve<const D: usize>(
    board: &Board<D>,
    config: &SearchConfig,
) -> Result<SearchResult, SearchError> {
    let start_time = Instant::now();
    let deadline = config.timeout.map(|timeout| start_time + timeout);
    let incumbent = Incumbent::new();

    info!(
        event = "search_start",
        depth = D,
        bound_pruning = config.bound_pruning,
        transposition = config.transposition,
        parallel = config.parallel,
    );

    let mut root = SearchContext::new(config, &incumbent, deadline);
    if config.parallel {
        if let Some(moves) = root.expand(board)? {
            let workers = moves
                .as_slice()
                .par_iter()
                .map(|mv| {
                    let mut worker = SearchContext::new(config, &incumbent, deadline);
                    worker.evaluate(&board.apply(mv))?;
                    Ok(worker)
                })
                .collect::<Result<Vec<_>, SearchError>>()?;
            for worker in workers {
                root.absorb(worker);
            }
        }
    } else {
        root.evaluate(board)?;
    }

    let stats = root.stats;
    let outcome = root.into_outcome();
    let time_elapsed_ms = start_time.elapsed().as_millis() as u64;

    info!(
        event = "search_end",
        cost = ?outcome.cost(),
        exhausted = !matches!(outcome, Outcome::Undetermined { .. }),
        nodes = stats.nodes_evaluated,
        duration_ms = time_elapsed_ms,
    );

    Ok(SearchResult {
        outcome,
        stats,
        time_elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Species, CORRIDOR_LEN};
    use Species::{A, B, C, D};

    fn sample() -> Board<2> {
        Board::from_rooms([[B, A], [C, D], [B, C], [D, A]])
    }

    fn config(bound_pruning: bool, transposition: bool) -> SearchConfig {
        SearchConfig {
            bound_pruning,
            transposition,
            ..SearchConfig::default()
        }
    }

    fn solved_cost<const N: usize>(board: &Board<N>, config: &SearchConfig) -> u32 {
        match solve(board, config).unwrap().outcome {
            Outcome::Solved(solution) => solution.cost,
            other => panic!("expected a solution, got {other:?}"),
        }
    }

    #[test]
    fn test_sample_depth_2() {
        assert_eq!(solved_cost(&sample(), &SearchConfig::default()), 12521);
    }

    #[test]
    fn test_puzzle_input_depth_2() {
        let board = Board::from_rooms([[D, C], [A, A], [D, B], [C, B]]);
        assert_eq!(solved_cost(&board, &SearchConfig::default()), 14546);
    }

    #[test]
    fn test_puzzle_input_depth_4() {
        let board = Board::from_rooms([[D, D, D, C], [A, C, B, A], [D, B, A, B], [C, A, C, B]]);
        assert_eq!(solved_cost(&board, &SearchConfig::default()), 42308);
    }

    #[test]
    fn test_each_pruning_rule_alone_keeps_optimum() {
        assert_eq!(solved_cost(&sample(), &config(false, true)), 12521);

        let swapped_pairs = Board::from_rooms([[B, A], [A, B], [D, C], [C, D]]);
        assert_eq!(solved_cost(&swapped_pairs, &config(true, false)), 4646);
        assert_eq!(solved_cost(&swapped_pairs, &config(false, true)), 4646);
    }

    #[test]
    fn test_no_pruning_keeps_optimum() {
        // B and A swapped at the top of their rooms
        let board = Board::from_rooms([[B, A], [A, B], [C, C], [D, D]]);

        let unpruned = solve(&board, &config(false, false)).unwrap();
        let pruned = solve(&board, &SearchConfig::default()).unwrap();

        assert_eq!(unpruned.outcome.cost(), Some(46));
        assert_eq!(pruned.outcome.cost(), Some(46));
        assert_eq!(unpruned.stats.pruned_by_bound, 0);
        assert_eq!(unpruned.stats.pruned_by_transposition, 0);
        assert!(pruned.stats.nodes_evaluated < unpruned.stats.nodes_evaluated);

        let swapped_pairs = Board::from_rooms([[B, A], [A, B], [D, C], [C, D]]);
        assert_eq!(solved_cost(&swapped_pairs, &config(false, false)), 4646);
        assert_eq!(solved_cost(&swapped_pairs, &SearchConfig::default()), 4646);
    }

    #[test]
    fn test_cost_matches_move_log() {
        let board = sample();
        let result = solve(&board, &SearchConfig::default()).unwrap();
        let solution = result.outcome.solution().unwrap();

        assert_eq!(solution.moves.iter().map(|m| m.cost).sum::<u32>(), solution.cost);

        let boards = board.replay(&solution.moves);
        let mut spent = 0;
        for (step, replayed) in boards.iter().enumerate() {
            assert_eq!(replayed.total_cost(), spent);
            assert!(replayed.check_counts().is_ok());
            if let Some(mv) = solution.moves.get(step) {
                spent += mv.cost;
            }
        }
        assert!(boards.last().unwrap().is_solved());
    }

    #[test]
    fn test_already_sorted_costs_nothing() {
        let result = solve(&Board::<2>::solved(), &SearchConfig::default()).unwrap();
        assert_eq!(
            result.outcome,
            Outcome::Solved(Solution {
                cost: 0,
                moves: Vec::new()
            })
        );
        assert_eq!(result.stats.nodes_evaluated, 1);

        let result = solve(&Board::<4>::solved(), &config(false, false)).unwrap();
        assert_eq!(result.outcome.cost(), Some(0));
    }

    #[test]
    fn test_deadlock_is_unsolvable() {
        // A and D parked facing each other across room B's doorway
        let mut corridor = [None; CORRIDOR_LEN];
        corridor[3] = Some(D);
        corridor[5] = Some(A);
        let board = Board::<2>::from_cells(
            [[None, Some(A)], [Some(B), Some(B)], [Some(C), Some(C)], [None, Some(D)]],
            corridor,
        );

        let result = solve(&board, &SearchConfig::default()).unwrap();
        assert_eq!(result.outcome, Outcome::Unsolvable);
        assert_eq!(result.stats.dead_ends, 1);
    }

    #[test]
    fn test_corrupted_board_aborts() {
        let board = Board::from_rooms([[B, A], [C, D], [B, C], [D, D]]);
        let err = solve(&board, &SearchConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SearchError::CorruptedBoard {
                species: A,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_zero_timeout_is_undetermined() {
        let config = SearchConfig {
            timeout: Some(Duration::ZERO),
            ..SearchConfig::default()
        };
        let result = solve(&sample(), &config).unwrap();
        assert_eq!(result.outcome, Outcome::Undetermined { best: None });
        assert_eq!(result.stats.nodes_evaluated, 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = SearchConfig {
            parallel: true,
            ..SearchConfig::default()
        };
        let result = solve(&sample(), &config).unwrap();
        let solution = result.outcome.solution().unwrap();

        assert!(matches!(result.outcome, Outcome::Solved(_)));
        assert_eq!(solution.cost, 12521);
        assert!(sample().replay(&solution.moves).last().unwrap().is_solved());
    }
}
