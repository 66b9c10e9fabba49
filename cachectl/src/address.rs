use crate::utils::bits::BitField;

/// Number of sets.
pub const SET_COUNT: usize = 8;
/// Blocks per set.
pub const WAYS: usize = 4;
/// 16-bit words per line.
pub const LINE_WORDS: usize = 8;
/// Address bits above the set index.
pub const TAG_BITS: u32 = 25;

/// A bus address split into cache fields.
///
/// tag = addr[31:7], set = addr[6:4], word = addr[3:1]. Bit 0 is unused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DecodedAddress {
    pub tag:  u32,
    pub set:  usize,
    pub word: usize,
}

impl DecodedAddress {
    pub fn new(addr: u32) -> Self {
        Self {
            tag:  addr.field(31, 7),
            set:  addr.field(6, 4) as usize,
            word: addr.field(3, 1) as usize,
        }
    }

    /// Byte address of word 0 of the line containing this address.
    pub fn line_base(&self) -> u32 {
        (self.tag << 7) | ((self.set as u32) << 4)
    }

    /// Byte address of a word in the same line.
    pub fn word_address(&self, word: usize) -> u32 {
        self.line_base() | (((word as u32) & 0x7) << 1)
    }
}
