use crate::mem::ByteLanes;

/// Memory interface with a 16-bit data bus.
///
/// Addresses are byte addresses. Bit 0 is ignored: all transfers are
/// halfword-aligned.
pub trait WordInterface {
    fn read_word(&self, addr: u32) -> u16;

    fn write_word(&mut self, addr: u32, data: u16);

    /// Write only the selected byte lanes of a word.
    fn write_lanes(&mut self, addr: u32, data: u16, lanes: ByteLanes) {
        if lanes.is_all() {
            self.write_word(addr, data);
        } else if !lanes.is_empty() {
            let mut bytes = self.read_word(addr).to_le_bytes();
            let new_bytes = data.to_le_bytes();
            if lanes.contains(ByteLanes::Lower) {
                bytes[0] = new_bytes[0];
            }
            if lanes.contains(ByteLanes::Upper) {
                bytes[1] = new_bytes[1];
            }
            self.write_word(addr, u16::from_le_bytes(bytes));
        }
    }
}
