//! Cache controller state machine.
//!
//! The controller is evaluated once per simulated clock. [Controller::evaluate]
//! is a pure function of the current register values and the sampled inputs,
//! and [Controller::step] commits its result at the clock edge.
//!
//! Outputs are rebuilt from [ControllerOutputs::default] every cycle, so a
//! state only drives what it asserts.

pub mod plru;
pub mod register;
pub mod signals;

#[cfg(test)]
mod test;

use crate::address::{DecodedAddress, LINE_WORDS, SET_COUNT};
use plru::PlruState;
use register::{Clocked, Counter, Reg};
pub use signals::*;

/// Controller FSM state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Reset = 0,
    InvalidateCache = 1,
    Idle = 2,
    CheckForCacheHit = 3,
    WaitForEndOfCacheRead = 4,
    ReadDataFromDramIntoCache = 5,
    CASDelay1 = 6,
    CASDelay2 = 7,
    BurstFill = 8,
    EndBurstFill = 9,
    WriteDataToDram = 10,
}

impl ControllerState {
    /// Debug encoding of the state.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a debug encoding. Unused encodings decode to Idle.
    pub fn from_code(code: u8) -> Self {
        use ControllerState::*;
        match code {
            0 => Reset,
            1 => InvalidateCache,
            2 => Idle,
            3 => CheckForCacheHit,
            4 => WaitForEndOfCacheRead,
            5 => ReadDataFromDramIntoCache,
            6 => CASDelay1,
            7 => CASDelay2,
            8 => BurstFill,
            9 => EndBurstFill,
            10 => WriteDataToDram,
            _ => Idle,
        }
    }

    /// Part of a miss sequence, which always runs to EndBurstFill.
    pub fn is_filling(self) -> bool {
        use ControllerState::*;
        matches!(self, ReadDataFromDramIntoCache | CASDelay1 | CASDelay2 | BurstFill)
    }
}

/// Register values of the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Registers {
    pub state:    ControllerState,
    pub counter:  u8,
    pub victim:   usize,
    pub lru_hold: PlruState,
}

/// Result of evaluating one cycle.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    pub next:    Registers,
    pub outputs: ControllerOutputs,
}

/// 4-way set-associative cache controller.
pub struct Controller {
    state:    Reg<ControllerState>,
    counter:  Counter,
    victim:   Reg<usize>,
    lru_hold: Reg<PlruState>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            state:    Reg::new(ControllerState::Reset),
            counter:  Counter::new(),
            victim:   Reg::new(0),
            lru_hold: Reg::new(PlruState::RESET),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state.sample()
    }

    pub fn counter(&self) -> u8 {
        self.counter.sample()
    }

    pub fn victim(&self) -> usize {
        self.victim.sample()
    }

    pub fn lru_hold(&self) -> PlruState {
        self.lru_hold.sample()
    }

    pub fn registers(&self) -> Registers {
        Registers {
            state:    self.state(),
            counter:  self.counter(),
            victim:   self.victim(),
            lru_hold: self.lru_hold(),
        }
    }

    /// Evaluate one cycle and commit it at the clock edge.
    pub fn step(&mut self, input: &ControllerInputs) -> ControllerOutputs {
        let Transition { next, outputs } = self.evaluate(input);
        let prev = self.state();
        if next.state != prev {
            log::trace!("{:?} -> {:?} (counter={})", prev, next.state, self.counter());
        }

        self.state.drive(next.state);
        self.victim.drive(next.victim);
        self.lru_hold.drive(next.lru_hold);
        if outputs.counter_reset {
            self.counter.reset();
        }
        self.update();

        outputs
    }

    /// Next register values and outputs for the current cycle.
    pub fn evaluate(&self, input: &ControllerInputs) -> Transition {
        use ControllerState::*;

        let regs = self.registers();
        let addr = DecodedAddress::new(input.address);
        let mut next = regs;
        let mut out = ControllerOutputs::default();

        next.state = if input.reset {
            Reset
        } else {
            match regs.state {
                Reset => {
                    out.counter_reset = true;
                    InvalidateCache
                },
                InvalidateCache => {
                    let set = regs.counter as usize;
                    if set < SET_COUNT {
                        out.arrays.set_index = set;
                        out.arrays.sweep_clear = true;
                        out.arrays.lru_we = true;
                        out.arrays.lru_value = PlruState::RESET;
                    }
                    if set + 1 >= SET_COUNT {
                        Idle
                    } else {
                        InvalidateCache
                    }
                },
                Idle => {
                    out.arrays.set_index = addr.set;
                    out.arrays.word_offset = addr.word;
                    if !input.request_active {
                        Idle
                    } else {
                        next.lru_hold = input.lru_state;
                        if input.write {
                            // Invalidate on write hit, then bypass to DRAM.
                            if let Some(block) = input.hit.lowest() {
                                out.arrays.valid_we = BlockMask::block(block);
                                out.arrays.valid_value = false;
                            }
                            out.dram = write_request(input);
                            WriteDataToDram
                        } else {
                            CheckForCacheHit
                        }
                    }
                },
                CheckForCacheHit => {
                    out.arrays.set_index = addr.set;
                    out.arrays.word_offset = addr.word;
                    if !input.request_active {
                        Idle
                    } else if let Some(block) = input.hit.lowest() {
                        out.arrays.lru_we = true;
                        out.arrays.lru_value = plru::promote(regs.lru_hold, block);
                        WaitForEndOfCacheRead
                    } else {
                        let (victim, lru) = plru::access(regs.lru_hold);
                        next.victim = victim;
                        out.arrays.lru_we = true;
                        out.arrays.lru_value = lru;
                        ReadDataFromDramIntoCache
                    }
                },
                WaitForEndOfCacheRead | EndBurstFill => {
                    out.arrays.set_index = addr.set;
                    out.arrays.word_offset = addr.word;
                    if input.request_active {
                        out.ack = true;
                        out.read_data = input.hit_data;
                        regs.state
                    } else {
                        Idle
                    }
                },
                ReadDataFromDramIntoCache => {
                    let victim = BlockMask::block(regs.victim);
                    out.arrays.set_index = addr.set;
                    out.arrays.tag_we = victim;
                    out.arrays.tag_value = addr.tag;
                    out.arrays.valid_we = victim;
                    out.arrays.valid_value = true;
                    out.dram = read_request(addr.line_base());
                    if input.access_ready {
                        CASDelay1
                    } else {
                        ReadDataFromDramIntoCache
                    }
                },
                CASDelay1 => {
                    out.arrays.set_index = addr.set;
                    out.dram = read_request(addr.line_base());
                    CASDelay2
                },
                CASDelay2 => {
                    out.arrays.set_index = addr.set;
                    out.dram = read_request(addr.line_base());
                    out.counter_reset = true;
                    BurstFill
                },
                BurstFill => {
                    let word = regs.counter as usize;
                    out.arrays.set_index = addr.set;
                    if word < LINE_WORDS {
                        out.arrays.word_offset = word;
                        out.arrays.data_we = BlockMask::block(regs.victim);
                        out.dram = read_request(addr.word_address(word));
                    }
                    if word + 1 >= LINE_WORDS {
                        EndBurstFill
                    } else {
                        BurstFill
                    }
                },
                WriteDataToDram => {
                    out.arrays.set_index = addr.set;
                    out.arrays.word_offset = addr.word;
                    if input.request_active {
                        out.dram = write_request(input);
                        out.dram.write_strobe = true;
                        out.ack = input.write_ack;
                        WriteDataToDram
                    } else {
                        Idle
                    }
                },
            }
        };

        next.counter = self.counter.next_value(out.counter_reset);

        Transition { next, outputs: out }
    }
}

impl Clocked for Controller {
    fn update(&mut self) {
        self.state.update();
        self.counter.update();
        self.victim.update();
        self.lru_hold.update();
    }
}

fn read_request(address: u32) -> DramRequest {
    DramRequest {
        address,
        read_strobe: true,
        ..Default::default()
    }
}

// Address and data for a bypass write. The strobe is left to the caller.
fn write_request(input: &ControllerInputs) -> DramRequest {
    DramRequest {
        address: input.address & !1,
        data:    input.write_data,
        lanes:   input.lanes,
        ..Default::default()
    }
}
