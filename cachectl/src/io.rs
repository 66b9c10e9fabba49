use crossbeam_channel::{
    Sender, Receiver, unbounded
};

use crate::SimError;
use crate::mem::ByteLanes;
use crate::system::Completion;

/// Transactions sent from the bus master to the simulation thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusMessage {
    Read(u32),
    Write { addr: u32, data: u16, lanes: ByteLanes },
    Reset,
}

/// Processor side of the bus.
///
/// Each call blocks until the simulation thread has completed the transaction,
/// so only one transaction is ever in flight.
pub struct BusPort {
    request_tx:    Sender<BusMessage>,
    completion_rx: Receiver<Result<Completion, SimError>>,
}

impl BusPort {
    pub fn new() -> (Self, BusIO) {
        let (request_tx, request_rx) = unbounded();
        let (completion_tx, completion_rx) = unbounded();
        let port = Self {
            request_tx,
            completion_rx,
        };
        let bus_io = BusIO {
            request_rx,
            completion_tx,
        };
        (port, bus_io)
    }

    pub fn read(&self, addr: u32) -> Result<Completion, SimError> {
        self.transact(BusMessage::Read(addr))
    }

    pub fn write(&self, addr: u32, data: u16, lanes: ByteLanes) -> Result<Completion, SimError> {
        self.transact(BusMessage::Write { addr, data, lanes })
    }

    pub fn reset(&self) -> Result<Completion, SimError> {
        self.transact(BusMessage::Reset)
    }

    pub fn transact(&self, message: BusMessage) -> Result<Completion, SimError> {
        self.request_tx.send(message).map_err(|_| SimError::Disconnected)?;
        self.completion_rx.recv().map_err(|_| SimError::Disconnected)?
    }
}

/// The component of the bus that lives on the simulation thread.
pub struct BusIO {
    request_rx:    Receiver<BusMessage>,
    completion_tx: Sender<Result<Completion, SimError>>,
}

impl BusIO {
    /// Blocks until the next transaction. None once the port has been dropped.
    pub fn next_request(&self) -> Option<BusMessage> {
        self.request_rx.recv().ok()
    }

    /// Returns false if the port has been dropped.
    pub fn complete(&self, result: Result<Completion, SimError>) -> bool {
        self.completion_tx.send(result).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_round_trip() {
        let (port, bus_io) = BusPort::new();
        let server = std::thread::spawn(move || {
            let mut served = Vec::new();
            while let Some(message) = bus_io.next_request() {
                served.push(message);
                let data = match message {
                    BusMessage::Read(addr) => addr as u16,
                    _ => 0,
                };
                bus_io.complete(Ok(Completion { data, cycles: 1 }));
            }
            served
        });

        assert_eq!(port.read(0x42).map(|c| c.data), Ok(0x42));
        assert_eq!(port.write(0x10, 1, ByteLanes::all()).map(|c| c.cycles), Ok(1));
        drop(port);

        let served = server.join().unwrap();
        assert_eq!(served, vec![
            BusMessage::Read(0x42),
            BusMessage::Write { addr: 0x10, data: 1, lanes: ByteLanes::all() },
        ]);
    }

    #[test]
    fn dropped_server_disconnects() {
        let (port, bus_io) = BusPort::new();
        drop(bus_io);
        assert_eq!(port.read(0), Err(SimError::Disconnected));
    }
}
