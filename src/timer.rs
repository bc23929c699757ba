//! Cooperative loop cadences.

/// Fixed inter-iteration sleep of the foreground loop.
pub const LOOP_DELAY_MS: u32 = 500;
/// Settling delay after a DHT11 exchange before the loop continues.
pub const DECODE_SETTLE_MS: u32 = 50;
/// Period of the shared timing source.
pub const TICK_PERIOD_MS: u32 = 1000;

/// The decoder runs on every 10th loop iteration, roughly every 5 s.
/// Coarser than the loop on purpose: the sensor needs over a second between
/// frames and the readings are more stable at this cadence.
pub const DECODE_EVERY_N_LOOPS: u8 = 10;
/// The display mode flips every 5th tick of the timing source. Independent
/// of the decode cadence; the two periods drift relative to each other.
pub const MODE_TOGGLE_TICKS: u8 = 5;

/// Counts loop iterations and fires on every `period`th advance, then
/// resets.
pub struct IntervalCounter {
    period: u8,
    count: u8,
}

impl IntervalCounter {
    pub fn new(period: u8) -> IntervalCounter {
        Self { period, count: 0 }
    }

    /// Advances by one iteration; true when the interval elapses.
    pub fn advance(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.period {
            self.count = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}
