macro_rules! bit {
    ($bit_num:expr) => {
        1 << $bit_num
    };
}

macro_rules! bits {
    [ $($bit_num:expr),* ] => {
        $(bit!($bit_num))|*
    };
}

pub(crate) use {bit, bits};

/// Extract bit fields from a bus value.
pub trait BitField: Copy {
    /// Extract bits `hi..=lo` (inclusive, verilog order), shifted down to bit 0.
    fn field(self, hi: u32, lo: u32) -> u32;

    /// Test a single bit.
    fn test(self, bit: u32) -> bool {
        self.field(bit, bit) != 0
    }
}

impl BitField for u32 {
    fn field(self, hi: u32, lo: u32) -> u32 {
        let width = hi - lo + 1;
        if width >= 32 {
            self >> lo
        } else {
            (self >> lo) & ((1 << width) - 1)
        }
    }
}

impl BitField for u8 {
    fn field(self, hi: u32, lo: u32) -> u32 {
        (self as u32).field(hi, lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_extract() {
        assert_eq!(0xDEAD_BEEF_u32.field(31, 28), 0xD);
        assert_eq!(0xDEAD_BEEF_u32.field(3, 0), 0xF);
        assert_eq!(0xDEAD_BEEF_u32.field(31, 0), 0xDEAD_BEEF);
        assert_eq!(0b101_u8.field(2, 2), 1);
        assert!(0b101_u8.test(0));
        assert!(!0b101_u8.test(1));
        assert_eq!(bits![0, 2], 0b101);
    }
}
