use crate::address::{LINE_WORDS, SET_COUNT, WAYS};
use crate::controller::{ArrayWrites, BlockMask};
use crate::controller::plru::PlruState;
use crate::utils::bits::*;

/// Contents of a single block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    pub tag:   u32,
    pub valid: bool,
    pub data:  [u16; LINE_WORDS],
}

/// Tag, valid, data and LRU storage for every set.
///
/// Pure storage: lookups are combinational, writes happen in [StorageArrays::commit]
/// at the clock edge.
pub struct StorageArrays {
    lines: [[Line; WAYS]; SET_COUNT],
    lru:   [PlruState; SET_COUNT],
}

impl StorageArrays {
    /// Arrays with power-up garbage: every block valid, with a pattern.
    ///
    /// Nothing is usable until the controller has swept the arrays after reset:
    /// lookups before InvalidateCache has finished can hit the garbage lines.
    pub fn new() -> Self {
        let line = Line {
            tag:   0x1FF_FFFF,
            valid: true,
            data:  [0xDEAD; LINE_WORDS],
        };
        Self {
            lines: [[line; WAYS]; SET_COUNT],
            lru:   [PlruState::new(bits![0, 1, 2]); SET_COUNT],
        }
    }

    /// Per-block hit and valid flags for `set`.
    pub fn lookup(&self, set: usize, tag: u32) -> (BlockMask, BlockMask) {
        let mut hit = BlockMask::empty();
        let mut valid = BlockMask::empty();
        for (block, line) in self.lines[set].iter().enumerate() {
            if line.valid {
                valid |= BlockMask::block(block);
                if line.tag == tag {
                    hit |= BlockMask::block(block);
                }
            }
        }
        (hit, valid)
    }

    pub fn lru(&self, set: usize) -> PlruState {
        self.lru[set]
    }

    /// The word at `word` of every block in `set`, in block order.
    pub fn words(&self, set: usize, word: usize) -> [u16; WAYS] {
        core::array::from_fn(|block| self.lines[set][block].data[word])
    }

    pub fn line(&self, set: usize, block: usize) -> &Line {
        &self.lines[set][block]
    }

    /// Apply the write port signals at the clock edge.
    ///
    /// `fill_data` is the value on the data write bus (backing store data).
    pub fn commit(&mut self, writes: &ArrayWrites, fill_data: u16) {
        let set = writes.set_index;
        if set >= SET_COUNT {
            return;
        }
        if writes.sweep_clear {
            for line in self.lines[set].iter_mut() {
                line.tag = 0;
                line.valid = false;
            }
        }
        for block in 0..WAYS {
            let mask = BlockMask::block(block);
            let line = &mut self.lines[set][block];
            if writes.tag_we.contains(mask) {
                line.tag = writes.tag_value;
            }
            if writes.valid_we.contains(mask) {
                line.valid = writes.valid_value;
            }
            if writes.data_we.contains(mask) && writes.word_offset < LINE_WORDS {
                line.data[writes.word_offset] = fill_data;
            }
        }
        if writes.lru_we {
            self.lru[set] = writes.lru_value;
        }
    }
}
