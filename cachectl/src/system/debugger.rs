use crate::address::{SET_COUNT, WAYS};
use crate::controller::{ControllerOutputs, Registers};
use crate::controller::plru::PlruState;
use crate::mem::{ByteLanes, Line};
use crate::{SimError, Stats};
use super::{BusRequest, BusResponse, CacheSystem, Completion};

/// Controller registers and the outputs of the last cycle.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot {
    pub cycle:     u64,
    pub registers: Registers,
    pub outputs:   ControllerOutputs,
}

/// Contents of one set.
#[derive(Clone, Copy, Debug)]
pub struct SetSnapshot {
    pub lru:   PlruState,
    pub lines: [Line; WAYS],
}

/// Debugger for the cache system.
/// This allows the user to step cycle-by-cycle and inspect internal state.
pub struct CacheDebugger {
    system: CacheSystem,
}

impl CacheDebugger {
    pub fn new(system: CacheSystem) -> Self {
        Self { system }
    }

    /// Clock a single cycle with the given bus signals.
    pub fn step(&mut self, req: &BusRequest) -> BusResponse {
        self.system.clock(req)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cycle:     self.system.stats.cycles,
            registers: self.system.controller.registers(),
            outputs:   self.system.last_outputs,
        }
    }

    /// Contents of `set`, or None if out of range.
    pub fn set_contents(&self, set: usize) -> Option<SetSnapshot> {
        if set >= SET_COUNT {
            return None;
        }
        let arrays = &self.system.arrays;
        Some(SetSnapshot {
            lru:   arrays.lru(set),
            lines: core::array::from_fn(|block| *arrays.line(set, block)),
        })
    }

    pub fn read_dram(&self, addr: u32) -> Result<u16, SimError> {
        self.system.peek_dram(addr)
    }

    pub fn read(&mut self, addr: u32) -> Result<Completion, SimError> {
        self.system.read(addr)
    }

    pub fn write(&mut self, addr: u32, data: u16) -> Result<Completion, SimError> {
        self.system.write(addr, data, ByteLanes::all())
    }

    pub fn reset(&mut self) -> Result<Completion, SimError> {
        self.system.reset()
    }

    pub fn stats(&self) -> Stats {
        self.system.stats()
    }
}
