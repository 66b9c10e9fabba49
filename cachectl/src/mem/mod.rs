//! Storage and backing store models around the controller.

mod arrays;
mod dram;
mod ram;
pub mod hit_mux;

pub use arrays::{Line, StorageArrays};
pub use dram::{Dram, DramTiming, CAS_LATENCY};
pub use ram::RAM;

use crate::utils::bits::*;

bitflags::bitflags! {
    /// Byte lane selects for a 16-bit write.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ByteLanes: u8 {
        const Lower = bit!(0);
        const Upper = bit!(1);
    }
}
