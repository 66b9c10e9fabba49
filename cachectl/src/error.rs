use std::fmt;

use crate::controller::ControllerState;

/// Failures seen by the processor side of the simulation.
///
/// The controller itself never fails; these come from the bus master
/// giving up or from the simulation plumbing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// No acknowledge within the configured number of cycles.
    Stalled { state: ControllerState, cycles: usize },
    /// Address not backed by the backing store.
    AddressOutOfRange(u32),
    /// The simulation thread has gone away.
    Disconnected,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Stalled { state, cycles } => write!(f, "no acknowledge after {} cycles (controller in {:?})", cycles, state),
            SimError::AddressOutOfRange(addr) => write!(f, "address ${:08X} is outside the backing store", addr),
            SimError::Disconnected => write!(f, "simulation thread disconnected"),
        }
    }
}

impl std::error::Error for SimError {}
