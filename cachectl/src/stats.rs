use crate::controller::{BlockMask, ControllerInputs, ControllerOutputs, ControllerState};

/// Counters collected while the system runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub cycles:              u64,
    pub reads:               u64,
    pub writes:              u64,
    pub hits:                u64,
    pub misses:              u64,
    /// Misses that replaced a valid block.
    pub evictions:           u64,
    /// Writes that cleared a cached copy.
    pub write_invalidations: u64,
    pub fill_words:          u64,
}

impl Stats {
    /// Account for one committed cycle.
    pub fn record(
        &mut self,
        prev: ControllerState,
        next: ControllerState,
        victim: usize,
        input: &ControllerInputs,
        out: &ControllerOutputs
    ) {
        use ControllerState::*;

        self.cycles += 1;
        match (prev, next) {
            (Idle, CheckForCacheHit) => self.reads += 1,
            (Idle, WriteDataToDram) => {
                self.writes += 1;
                if !out.arrays.valid_we.is_empty() {
                    self.write_invalidations += 1;
                }
            },
            (CheckForCacheHit, WaitForEndOfCacheRead) => self.hits += 1,
            (CheckForCacheHit, ReadDataFromDramIntoCache) => {
                self.misses += 1;
                if input.valid.contains(BlockMask::block(victim)) {
                    self.evictions += 1;
                }
            },
            _ => {},
        }
        if !out.arrays.data_we.is_empty() {
            self.fill_words += 1;
        }
    }

    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        if total > 0 {
            Some(self.hits as f64 / total as f64)
        } else {
            None
        }
    }

    pub fn print(&self) {
        println!("-----------------------------");
        println!("Cycles:               {}", self.cycles);
        println!("Reads:                {}", self.reads);
        println!("Writes:               {}", self.writes);
        match self.hit_rate() {
            Some(rate) => println!(
                "Hit rate:             {:.2}% ({} / {})",
                rate * 100.0,
                self.hits,
                self.hits + self.misses
            ),
            None => println!("Hit rate:             N/A"),
        }
        println!("Evictions:            {}", self.evictions);
        println!("Write invalidations:  {}", self.write_invalidations);
        println!("Words filled:         {}", self.fill_words);
        println!("-----------------------------");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate() {
        let mut stats = Stats::default();
        assert_eq!(stats.hit_rate(), None);
        stats.hits = 3;
        stats.misses = 1;
        assert_eq!(stats.hit_rate(), Some(0.75));
    }

    #[test]
    fn miss_into_valid_block_is_eviction() {
        let mut stats = Stats::default();
        let input = ControllerInputs { valid: BlockMask::Block2, ..Default::default() };
        let out = ControllerOutputs::default();
        use ControllerState::*;
        stats.record(CheckForCacheHit, ReadDataFromDramIntoCache, 0, &input, &out);
        stats.record(CheckForCacheHit, ReadDataFromDramIntoCache, 2, &input, &out);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.cycles, 2);
    }
}
