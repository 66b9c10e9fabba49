use crate::address::WAYS;
use crate::controller::BlockMask;

/// Select the data word of the hitting block.
///
/// Lowest-numbered asserted hit wins. With no hit the output is 0.
pub fn select(hit: BlockMask, words: &[u16; WAYS]) -> u16 {
    match hit.lowest() {
        Some(block) => words[block],
        None => 0,
    }
}
