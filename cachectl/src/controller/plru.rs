//! Tree pseudo-LRU over the 4 blocks of a set.
//!
//! bit 2 picks the left pair {0,1} or the right pair {2,3}, bit 1 picks
//! between 0 and 1, bit 0 picks between 2 and 3.
//!
//! The same table is used for victim selection on a miss and for
//! promotion on a hit.

use crate::utils::bits::*;

/// 3-bit pseudo-LRU state of a single set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PlruState(u8);

impl PlruState {
    /// State after the invalidation sweep.
    pub const RESET: PlruState = PlruState(0);

    /// Bits above 2 are dropped.
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    fn root(self) -> bool {
        self.0.test(2)
    }

    fn left(self) -> bool {
        self.0.test(1)
    }

    fn right(self) -> bool {
        self.0.test(0)
    }

    fn from_tree(root: bool, left: bool, right: bool) -> Self {
        let mut bits = 0;
        if root {
            bits |= bit!(2);
        }
        if left {
            bits |= bit!(1);
        }
        if right {
            bits |= bit!(0);
        }
        Self(bits)
    }
}

/// Leaf the tree currently points at.
pub fn victim(state: PlruState) -> usize {
    match (state.left(), state.right()) {
        (false, false) => 0,
        (true, false) => 1,
        _ if !state.root() && state.right() => 2,
        _ => 3,
    }
}

/// New state after `leaf` has been accessed.
pub fn promote(state: PlruState, leaf: usize) -> PlruState {
    match leaf {
        0 => PlruState::from_tree(state.root(), true, true),
        1 => PlruState::from_tree(state.root(), false, true),
        2 => PlruState::from_tree(true, state.left(), false),
        _ => PlruState::from_tree(false, state.left(), false),
    }
}

/// Select a victim and the state that replaces it.
pub fn access(state: PlruState) -> (usize, PlruState) {
    let leaf = victim(state);
    (leaf, promote(state, leaf))
}
