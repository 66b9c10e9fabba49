use crate::utils::interface::WordInterface;

/// A block of read-write RAM with a 16-bit data bus.
pub struct RAM {
    data: Vec<u16>
}

impl RAM {
    /// Create RAM holding `words` 16-bit words.
    pub fn new(words: usize) -> Self {
        Self {
            data: vec![0; words]
        }
    }

    /// Size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len() * 2
    }

    /// True if the byte address maps to a word in this RAM.
    pub fn contains(&self, addr: u32) -> bool {
        (addr as usize) < self.byte_len()
    }

    /// Copy a little-endian byte image in, starting at byte address `addr`.
    ///
    /// Bytes past the end of RAM are dropped. Returns the number of bytes copied.
    pub fn load_bytes(&mut self, addr: u32, bytes: &[u8]) -> usize {
        let mut copied = 0;
        for (n, byte) in bytes.iter().enumerate() {
            let byte_addr = addr as usize + n;
            let Some(word) = self.data.get_mut(byte_addr / 2) else {
                break;
            };
            let mut word_bytes = word.to_le_bytes();
            word_bytes[byte_addr % 2] = *byte;
            *word = u16::from_le_bytes(word_bytes);
            copied += 1;
        }
        copied
    }
}

impl WordInterface for RAM {
    fn read_word(&self, addr: u32) -> u16 {
        self.data[(addr >> 1) as usize]
    }

    fn write_word(&mut self, addr: u32, data: u16) {
        self.data[(addr >> 1) as usize] = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::ByteLanes;

    #[test]
    fn ram_readwrite() {
        let mut ram = RAM::new(16);
        ram.write_word(0x4, 0xBEEF);
        assert_eq!(ram.read_word(0x4), 0xBEEF);
        // Low address bit is ignored.
        assert_eq!(ram.read_word(0x5), 0xBEEF);
        assert_eq!(ram.read_word(0x6), 0);
    }

    #[test]
    fn ram_lanes() {
        let mut ram = RAM::new(16);
        ram.write_word(0x0, 0x1234);
        ram.write_lanes(0x0, 0xABCD, ByteLanes::Upper);
        assert_eq!(ram.read_word(0x0), 0xAB34);
        ram.write_lanes(0x0, 0xABCD, ByteLanes::Lower);
        assert_eq!(ram.read_word(0x0), 0xABCD);
        ram.write_lanes(0x0, 0x0000, ByteLanes::empty());
        assert_eq!(ram.read_word(0x0), 0xABCD);
    }

    #[test]
    fn ram_load_bytes() {
        let mut ram = RAM::new(2);
        assert_eq!(ram.load_bytes(1, &[0x11, 0x22, 0x33, 0x44]), 3);
        assert_eq!(ram.read_word(0), 0x1100);
        assert_eq!(ram.read_word(2), 0x3322);
        assert_eq!(ram.byte_len(), 4);
        assert!(ram.contains(3));
        assert!(!ram.contains(4));
    }
}
