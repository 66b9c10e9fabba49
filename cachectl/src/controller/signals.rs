use crate::address::WAYS;
use crate::mem::ByteLanes;
use crate::utils::bits::*;
use super::plru::PlruState;

bitflags::bitflags! {
    /// One flag per block of a set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct BlockMask: u8 {
        const Block0 = bit!(0);
        const Block1 = bit!(1);
        const Block2 = bit!(2);
        const Block3 = bit!(3);
    }
}

impl BlockMask {
    /// Mask with only `block` set. Out of range blocks give an empty mask.
    pub fn block(block: usize) -> Self {
        if block < WAYS {
            Self::from_bits_truncate(1 << block)
        } else {
            Self::empty()
        }
    }

    /// Lowest-numbered block in the mask.
    pub fn lowest(self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.bits().trailing_zeros() as usize)
        }
    }

    /// At most one block selected.
    pub fn is_one_hot(self) -> bool {
        self.bits().count_ones() <= 1
    }
}

/// Everything the controller samples in one cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControllerInputs {
    pub reset:          bool,

    // Processor bus.
    pub request_active: bool,
    pub address:        u32,
    pub write:          bool,
    pub write_data:     u16,
    pub lanes:          ByteLanes,

    // Storage lookup for the addressed set.
    pub hit:            BlockMask,
    pub valid:          BlockMask,
    pub lru_state:      PlruState,
    /// Output of the hit-data mux.
    pub hit_data:       u16,

    // Backing store.
    pub access_ready:   bool,
    pub write_ack:      bool,
}

/// Storage array write port signals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArrayWrites {
    pub set_index:   usize,
    pub word_offset: usize,
    pub tag_we:      BlockMask,
    pub data_we:     BlockMask,
    pub valid_we:    BlockMask,
    pub tag_value:   u32,
    pub valid_value: bool,
    pub lru_we:      bool,
    pub lru_value:   PlruState,
    /// Clear tags and valid bits of every block in `set_index`.
    pub sweep_clear: bool,
}

impl ArrayWrites {
    /// True if no write of any kind is requested.
    pub fn is_idle(&self) -> bool {
        self.tag_we.is_empty() &&
        self.data_we.is_empty() &&
        self.valid_we.is_empty() &&
        !self.lru_we &&
        !self.sweep_clear
    }
}

/// Backing store request signals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DramRequest {
    pub address:      u32,
    pub data:         u16,
    pub lanes:        ByteLanes,
    pub read_strobe:  bool,
    pub write_strobe: bool,
}

/// Everything the controller drives in one cycle.
///
/// The default value is the safe default: nothing written, nothing requested,
/// no acknowledge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerOutputs {
    pub ack:           bool,
    pub read_data:     u16,
    pub arrays:        ArrayWrites,
    pub dram:          DramRequest,
    pub counter_reset: bool,
}
