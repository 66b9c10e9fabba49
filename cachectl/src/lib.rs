//! Cycle-stepped model of a 4-way set-associative cache controller with
//! pseudo-LRU replacement and burst line fill.

mod utils;
mod io;
mod stats;
mod error;

pub mod address;
pub mod controller;
pub mod mem;
pub mod system;
pub mod trace;

pub use crate::error::SimError;
pub use crate::io::{BusMessage, BusPort};
pub use crate::stats::Stats;
pub use crate::system::{
    BusRequest, BusResponse, CacheDebugger, CacheSystem, Completion, SetSnapshot, Snapshot
};
pub use crate::utils::interface::WordInterface;
pub use crate::mem::{ByteLanes, DramTiming};

/// Config for the cache system.
#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    /// Size of the backing store in 16-bit words.
    pub dram_words:  usize,
    /// Backing store timing.
    pub timing:      DramTiming,
    /// Cycles the bus master waits for an acknowledge before giving up.
    pub stall_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dram_words:  64 * 1024,
            timing:      DramTiming::default(),
            stall_limit: 10_000,
        }
    }
}
