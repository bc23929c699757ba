//! State shared between interrupt context and the foreground loop.
//!
//! Exactly three things cross the context boundary: the latest raw ADC
//! sample with its ready flag, the one second tick counter, and the display
//! mode selector. Everything else in the system is foreground-only.
//!
//! The interrupt side publishes through the free functions at the bottom,
//! which take a [`critical_section`]; the implementation saves and restores
//! the prior interrupt state, so nested sections are safe. The pure
//! transitions live on [`SharedState`] and are tested against a local
//! instance without any masking.

use core::cell::Cell;

use critical_section::Mutex;

use crate::moisture::RAW_DRY;
use crate::timer::MODE_TOGGLE_TICKS;

/// Which of the two views the next render pass draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Sensor,
    Moisture,
}

impl DisplayMode {
    fn toggled(self) -> Self {
        match self {
            DisplayMode::Sensor => DisplayMode::Moisture,
            DisplayMode::Moisture => DisplayMode::Sensor,
        }
    }
}

/// The cross-context variables, interior-mutable so the ISR side can write
/// through a shared reference inside a critical section.
pub struct SharedState {
    sample: Cell<u16>,
    ready: Cell<bool>,
    ticks: Cell<u8>,
    mode: Cell<DisplayMode>,
}

impl SharedState {
    /// Before the first conversion completes the node assumes dry soil.
    pub const fn new() -> Self {
        SharedState {
            sample: Cell::new(RAW_DRY),
            ready: Cell::new(false),
            ticks: Cell::new(0),
            mode: Cell::new(DisplayMode::Sensor),
        }
    }

    /// Publishes a completed conversion. No bounds checking here; the raw
    /// domain is not validated until consumption.
    pub fn publish_sample(&self, raw: u16) {
        self.sample.set(raw);
        self.ready.set(true);
    }

    /// Consumes the pending sample, if any. Clearing the ready flag in the
    /// same critical section as the read keeps a sample from ever being
    /// evaluated twice; a stale value simply stays unready.
    pub fn take_sample(&self) -> Option<u16> {
        if self.ready.replace(false) {
            Some(self.sample.get())
        } else {
            None
        }
    }

    /// One tick of the ~1 Hz timing source. Every [`MODE_TOGGLE_TICKS`]th
    /// tick resets the counter and flips the display mode.
    pub fn tick(&self) {
        let ticks = self.ticks.get() + 1;
        if ticks >= MODE_TOGGLE_TICKS {
            self.ticks.set(0);
            self.mode.set(self.mode.get().toggled());
        } else {
            self.ticks.set(ticks);
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode.get()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        SharedState::new()
    }
}

static STATE: Mutex<SharedState> = Mutex::new(SharedState::new());

/// ISR side: publish a completed ADC conversion.
pub fn publish_sample(raw: u16) {
    critical_section::with(|cs| STATE.borrow(cs).publish_sample(raw));
}

/// ISR side: advance the timing source.
pub fn tick() {
    critical_section::with(|cs| STATE.borrow(cs).tick());
}

/// Foreground side: consume the pending sample, clearing the ready flag.
pub fn take_sample() -> Option<u16> {
    critical_section::with(|cs| STATE.borrow(cs).take_sample())
}

/// Foreground side: the view selected by the timing source.
pub fn display_mode() -> DisplayMode {
    critical_section::with(|cs| STATE.borrow(cs).mode())
}
