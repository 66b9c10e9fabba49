use crate::controller::DramRequest;
use crate::utils::interface::WordInterface;
use super::RAM;

/// Cycles between the access starting and burst data becoming valid.
pub const CAS_LATENCY: usize = 2;

/// Backing store timing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DramTiming {
    /// Cycles from the read strobe to access ready (at least 1).
    pub row_latency:   usize,
    /// Cycles from the write strobe to write acknowledge (at least 1).
    pub write_latency: usize,
}

impl Default for DramTiming {
    fn default() -> Self {
        Self {
            row_latency:   1,
            write_latency: 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReadPhase {
    Closed,
    Activating(usize),
    Cas(usize),
    Burst,
}

/// Backing store controller.
///
/// Reads: the read strobe opens an access. After the row latency
/// `access_ready` is raised, and CAS_LATENCY cycles later the word at the
/// driven address is presented on `data_in` every cycle until the strobe
/// drops.
///
/// Writes: the write is committed once, `write_latency` cycles into the
/// strobe, and acknowledged until the strobe drops.
pub struct Dram {
    ram:        RAM,
    timing:     DramTiming,
    read_phase: ReadPhase,
    write_wait: usize,
    write_done: bool,
}

impl Dram {
    pub fn new(words: usize, timing: DramTiming) -> Self {
        Self {
            ram:        RAM::new(words),
            timing,
            read_phase: ReadPhase::Closed,
            write_wait: 0,
            write_done: false,
        }
    }

    pub fn ram(&self) -> &RAM {
        &self.ram
    }

    pub fn mut_ram(&mut self) -> &mut RAM {
        &mut self.ram
    }

    pub fn access_ready(&self) -> bool {
        matches!(self.read_phase, ReadPhase::Cas(_) | ReadPhase::Burst)
    }

    /// Burst data for the address currently driven.
    ///
    /// Zero until the CAS latency has passed.
    pub fn data_in(&self, addr: u32) -> u16 {
        if self.read_phase == ReadPhase::Burst && self.ram.contains(addr) {
            self.ram.read_word(addr)
        } else {
            0
        }
    }

    pub fn write_ack(&self) -> bool {
        self.write_done
    }

    /// Clock edge, with the request driven during the cycle.
    pub fn clock(&mut self, req: &DramRequest) {
        self.read_phase = if req.read_strobe {
            match self.read_phase {
                ReadPhase::Closed if self.timing.row_latency <= 1 => ReadPhase::Cas(CAS_LATENCY),
                ReadPhase::Closed => ReadPhase::Activating(self.timing.row_latency - 1),
                ReadPhase::Activating(n) if n <= 1 => ReadPhase::Cas(CAS_LATENCY),
                ReadPhase::Activating(n) => ReadPhase::Activating(n - 1),
                ReadPhase::Cas(n) if n <= 1 => ReadPhase::Burst,
                ReadPhase::Cas(n) => ReadPhase::Cas(n - 1),
                ReadPhase::Burst => ReadPhase::Burst,
            }
        } else {
            ReadPhase::Closed
        };

        if req.write_strobe {
            if !self.write_done {
                self.write_wait += 1;
                if self.write_wait >= self.timing.write_latency.max(1) {
                    self.commit_write(req);
                    self.write_done = true;
                }
            }
        } else {
            self.write_wait = 0;
            self.write_done = false;
        }
    }

    fn commit_write(&mut self, req: &DramRequest) {
        if self.ram.contains(req.address) {
            self.ram.write_lanes(req.address, req.data, req.lanes);
        } else {
            log::warn!("DRAM write to unmapped address {:08X} dropped", req.address);
        }
    }
}
