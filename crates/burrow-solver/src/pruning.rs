//! Pruning rules for the branch-and-bound search.
//!
//! Two independent rules cut the move tree:
//! - the incumbent bound drops any branch that has already spent at least
//!   as much as the best complete solution found so far;
//! - the transposition table drops any branch that reaches a layout
//!   already reached at equal or lower cost.
//!
//! Neither rule changes the optimum; both only shrink the tree.

use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

/// Value held by the incumbent while no solution is known
const NO_SOLUTION: u32 = u32::MAX;

/// Cost of the best complete solution found so far.
///
/// Lock-free so parallel workers can share one bound.
#[derive(Debug)]
pub struct Incumbent {
    cost: AtomicU32,
}

impl Incumbent {
    pub fn new() -> Self {
        Self {
            cost: AtomicU32::new(NO_SOLUTION),
        }
    }

    pub fn get(&self) -> Option<u32> {
        match self.cost.load(Ordering::Acquire) {
            NO_SOLUTION => None,
            cost => Some(cost),
        }
    }

    /// Offer the cost of a complete solution.
    ///
    /// Returns true if it strictly improves on the current bound.
    pub fn offer(&self, cost: u32) -> bool {
        self.cost.fetch_min(cost, Ordering::AcqRel) > cost
    }

    /// A branch that has already spent `cost` cannot beat the bound.
    pub fn exceeded_by(&self, cost: u32) -> bool {
        self.get().is_some_and(|best| cost >= best)
    }
}

impl Default for Incumbent {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheapest cost at which each layout has been reached.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    best: FxHashMap<u128, u32>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record reaching the layout `key` at `cost`.
    ///
    /// Returns true when the layout was already reached at the same or lower
    /// cost, in which case the branch can be dropped.
    pub fn revisit(&mut self, key: u128, cost: u32) -> bool {
        match self.best.entry(key) {
            Entry::Occupied(mut entry) => {
                if *entry.get() <= cost {
                    true
                } else {
                    entry.insert(cost);
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(cost);
                false
            }
        }
    }

    /// Number of distinct layouts recorded
    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incumbent_starts_unset() {
        let incumbent = Incumbent::new();
        assert_eq!(incumbent.get(), None);
        assert!(!incumbent.exceeded_by(u32::MAX - 1));
    }

    #[test]
    fn test_incumbent_only_improves() {
        let incumbent = Incumbent::new();
        assert!(incumbent.offer(500));
        assert!(!incumbent.offer(700));
        assert!(!incumbent.offer(500));
        assert!(incumbent.offer(120));
        assert_eq!(incumbent.get(), Some(120));
    }

    #[test]
    fn test_bound_prunes_equal_cost() {
        let incumbent = Incumbent::new();
        incumbent.offer(100);
        assert!(incumbent.exceeded_by(100));
        assert!(incumbent.exceeded_by(101));
        assert!(!incumbent.exceeded_by(99));
    }

    #[test]
    fn test_transposition_keeps_cheapest() {
        let mut table = TranspositionTable::new();
        assert!(table.is_empty());

        assert!(!table.revisit(7, 40));
        assert!(table.revisit(7, 40));
        assert!(table.revisit(7, 55));
        assert!(!table.revisit(7, 30));
        assert!(table.revisit(7, 35));
        assert!(!table.revisit(8, 1000));
        assert_eq!(table.len(), 2);
    }
}
