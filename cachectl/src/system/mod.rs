mod debugger;


pub use debugger::{CacheDebugger, SetSnapshot, Snapshot};

use crate::{CacheConfig, SimError, Stats};
use crate::address::DecodedAddress;
use crate::controller::{Controller, ControllerInputs, ControllerOutputs, ControllerState};
use crate::io::{BusIO, BusMessage, BusPort};
use crate::mem::{hit_mux, ByteLanes, Dram, StorageArrays};
use crate::utils::interface::WordInterface;

/// Processor bus signals for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusRequest {
    pub active:  bool,
    pub address: u32,
    pub write:   bool,
    pub data:    u16,
    pub lanes:   ByteLanes,
}

impl BusRequest {
    /// Request line deasserted.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn read(address: u32) -> Self {
        Self {
            active: true,
            address,
            ..Default::default()
        }
    }

    pub fn write(address: u32, data: u16, lanes: ByteLanes) -> Self {
        Self {
            active: true,
            address,
            write: true,
            data,
            lanes,
        }
    }
}

/// Processor-visible result of one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusResponse {
    pub ack:   bool,
    pub data:  u16,
    /// Controller state after the clock edge.
    pub state: ControllerState,
}

/// A finished bus transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Read data (0 for writes).
    pub data:   u16,
    /// Cycles from request to acknowledge, inclusive.
    pub cycles: usize,
}

/// The controller wired to its storage arrays, hit mux and backing store,
/// driven by a simple in-order bus master.
pub struct CacheSystem {
    config:        CacheConfig,
    controller:    Controller,
    arrays:        StorageArrays,
    dram:          Dram,
    stats:         Stats,
    reset_pending: bool,
    last_outputs:  ControllerOutputs,
}

impl CacheSystem {
    /// Create a system. The controller starts in Reset and sweeps the
    /// arrays during the first cycles it is clocked.
    pub fn new(config: CacheConfig) -> Self {
        let dram = Dram::new(config.dram_words, config.timing);
        Self {
            config,
            controller:    Controller::new(),
            arrays:        StorageArrays::new(),
            dram,
            stats:         Stats::default(),
            reset_pending: false,
            last_outputs:  ControllerOutputs::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    /// Make a debugger for stepping cycle by cycle.
    pub fn make_debugger(self) -> CacheDebugger {
        CacheDebugger::new(self)
    }

    /// Copy a little-endian image into the backing store.
    pub fn load_image(&mut self, addr: u32, bytes: &[u8]) -> usize {
        self.dram.mut_ram().load_bytes(addr, bytes)
    }

    /// Read the backing store directly, bypassing the cache.
    pub fn peek_dram(&self, addr: u32) -> Result<u16, SimError> {
        let ram = self.dram.ram();
        if ram.contains(addr) {
            Ok(ram.read_word(addr))
        } else {
            Err(SimError::AddressOutOfRange(addr))
        }
    }

    /// Simulate one clock cycle.
    pub fn clock(&mut self, req: &BusRequest) -> BusResponse {
        let addr = DecodedAddress::new(req.address);
        let (hit, valid) = self.arrays.lookup(addr.set, addr.tag);
        let hit_data = hit_mux::select(hit, &self.arrays.words(addr.set, addr.word));

        let input = ControllerInputs {
            reset:          std::mem::replace(&mut self.reset_pending, false),
            request_active: req.active,
            address:        req.address,
            write:          req.write,
            write_data:     req.data,
            lanes:          req.lanes,
            hit,
            valid,
            lru_state:      self.arrays.lru(addr.set),
            hit_data,
            access_ready:   self.dram.access_ready(),
            write_ack:      self.dram.write_ack(),
        };

        let prev = self.controller.state();
        let out = self.controller.step(&input);
        let next = self.controller.state();
        self.log_decision(prev, next, &addr, &input, &out);
        self.stats.record(prev, next, self.controller.victim(), &input, &out);

        // Clock edge: storage first, with the data the backing store drives this cycle.
        let fill_data = self.dram.data_in(out.dram.address);
        self.arrays.commit(&out.arrays, fill_data);
        self.dram.clock(&out.dram);
        self.last_outputs = out;

        BusResponse {
            ack:   out.ack,
            data:  out.read_data,
            state: next,
        }
    }

    /// Read a word through the cache.
    pub fn read(&mut self, addr: u32) -> Result<Completion, SimError> {
        self.transact(BusRequest::read(addr))
    }

    /// Write a word around the cache.
    pub fn write(&mut self, addr: u32, data: u16, lanes: ByteLanes) -> Result<Completion, SimError> {
        self.transact(BusRequest::write(addr, data, lanes))
    }

    /// Assert reset for one cycle and run until the invalidation sweep is done.
    pub fn reset(&mut self) -> Result<Completion, SimError> {
        log::info!("cache reset");
        self.reset_pending = true;
        let mut cycles = 0;
        loop {
            self.clock(&BusRequest::idle());
            cycles += 1;
            if self.state() == ControllerState::Idle {
                return Ok(Completion { data: 0, cycles });
            }
            if cycles >= self.config.stall_limit {
                return Err(SimError::Stalled { state: self.state(), cycles });
            }
        }
    }

    /// Run a thread that serves the bus port.
    ///
    /// The thread exits once the port is dropped, returning the final stats.
    pub fn spawn(self) -> (BusPort, std::thread::JoinHandle<Stats>) {
        let (port, bus_io) = BusPort::new();
        let handle = std::thread::spawn(move || {
            let mut system = self;
            system.serve(bus_io);
            system.stats
        });
        (port, handle)
    }

    fn serve(&mut self, bus_io: BusIO) {
        while let Some(message) = bus_io.next_request() {
            let result = match message {
                BusMessage::Read(addr) => self.read(addr),
                BusMessage::Write { addr, data, lanes } => self.write(addr, data, lanes),
                BusMessage::Reset => self.reset(),
            };
            if !bus_io.complete(result) {
                break;
            }
        }
        log::debug!("bus port closed after {} cycles", self.stats.cycles);
    }

    /// Strobe/acknowledge handshake: hold the request until acknowledged,
    /// then drop the request line for one cycle.
    fn transact(&mut self, req: BusRequest) -> Result<Completion, SimError> {
        if !self.dram.ram().contains(req.address) {
            return Err(SimError::AddressOutOfRange(req.address));
        }
        let mut cycles = 0;
        let data = loop {
            let resp = self.clock(&req);
            cycles += 1;
            if resp.ack {
                break resp.data;
            }
            if cycles >= self.config.stall_limit {
                let state = self.state();
                // A line fill can't be abandoned: finish it on the same address.
                while self.state().is_filling() {
                    self.clock(&req);
                }
                self.clock(&BusRequest::idle());
                return Err(SimError::Stalled { state, cycles });
            }
        };
        self.clock(&BusRequest::idle());
        Ok(Completion { data, cycles })
    }

    fn log_decision(
        &self,
        prev: ControllerState,
        next: ControllerState,
        addr: &DecodedAddress,
        input: &ControllerInputs,
        out: &ControllerOutputs
    ) {
        use ControllerState::*;
        match (prev, next) {
            (CheckForCacheHit, WaitForEndOfCacheRead) => log::debug!(
                "read hit ${:08X}: set {} block {:?}", input.address, addr.set, input.hit.lowest()
            ),
            (CheckForCacheHit, ReadDataFromDramIntoCache) => log::debug!(
                "read miss ${:08X}: set {} victim {} (valid {:?})",
                input.address, addr.set, self.controller.victim(), input.valid
            ),
            (Idle, WriteDataToDram) if !out.arrays.valid_we.is_empty() => log::debug!(
                "write ${:08X}: invalidated set {} {:?}", input.address, addr.set, out.arrays.valid_we
            ),
            (InvalidateCache, Idle) => log::info!("invalidation sweep complete"),
            _ => {},
        }
    }
}
