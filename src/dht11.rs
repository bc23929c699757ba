//! DHT11 single-wire protocol decoder.
//!
//! The sensor speaks a half-duplex pulse-width protocol on one shared line:
//! the controller holds the line low to request a frame, the sensor answers
//! with a low/high handshake and then clocks out 40 bits, where the length of
//! each high pulse encodes the bit value.
//!
//! The decoder is generic over an [`embedded_hal`] pin and delay provider so
//! the whole exchange can be driven by a scripted line in tests. On hardware
//! it must run with interrupts suppressed for its full duration; a stray
//! interrupt in the middle of a bit read corrupts the pulse timing.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

// Protocol timings. The datasheet minimum for the start hold is 18 ms; the
// rest follow the response/bit pulse widths of the fixed 40-bit frame.
const START_HOLD_MS: u32 = 25;
const START_RELEASE_US: u32 = 25;
const RESPONSE_GUARD_US: u32 = 40;
const RESPONSE_LOW_US: u32 = 80;
const RESPONSE_HIGH_US: u32 = 80;
// Sampling point between the ~30 us "0" pulse and the ~70 us "1" pulse.
const BIT_SAMPLE_US: u32 = 30;
const POLL_STEP_US: u32 = 1;
const MAX_POLLS: u32 = 100;

/// One validated 5-byte frame, minus the checksum byte.
///
/// Integral and fractional parts are kept as the raw bytes the sensor sent;
/// the display layer decides how to project them into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFrame {
    pub humidity: u8,
    pub humidity_frac: u8,
    pub temperature: u8,
    pub temperature_frac: u8,
}

/// Errors that may occur during one decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtError<E> {
    /// GPIO pin errors.
    Pin(E),
    /// The sensor never produced the low/high response handshake.
    NoResponse,
    /// A bit-level wait exceeded its poll bound.
    Timeout,
    /// The fifth byte did not match the truncated sum of the first four.
    ChecksumMismatch,
}

impl<E> From<E> for DhtError<E> {
    fn from(e: E) -> Self {
        DhtError::Pin(e)
    }
}

/// Last decode outcome as seen by the display path.
///
/// Set only by the decode step of the main loop, read only when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorState {
    #[default]
    None,
    NoResponse,
    Timeout,
    ChecksumMismatch,
}

impl<E> From<&DhtError<E>> for ErrorState {
    fn from(e: &DhtError<E>) -> Self {
        match e {
            DhtError::NoResponse => ErrorState::NoResponse,
            DhtError::Timeout => ErrorState::Timeout,
            DhtError::ChecksumMismatch => ErrorState::ChecksumMismatch,
            // A faulted pin reads the same as a silent bus.
            DhtError::Pin(_) => ErrorState::NoResponse,
        }
    }
}

/// The DHT11 decoder.
///
/// `P` is the shared data line, emulating open drain: `set_low` drives the
/// line, `set_high` releases it so the sensor (or the pull-up) owns it.
pub struct Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Runs one full decode attempt: start sequence, response handshake,
    /// five bytes, checksum. Always yields exactly one definite outcome,
    /// never a partial frame.
    ///
    /// Not reentrant; the caller must keep interrupts suppressed (with the
    /// prior mask state saved and restored, not force-enabled) while this
    /// runs.
    pub fn read(&mut self) -> Result<SensorFrame, DhtError<P::Error>> {
        self.send_start_signal()?;
        self.check_response()?;

        let mut bytes = [0u8; 5];
        for byte in bytes.iter_mut() {
            *byte = self.read_byte()?;
        }

        let sum = bytes[0]
            .wrapping_add(bytes[1])
            .wrapping_add(bytes[2])
            .wrapping_add(bytes[3]);
        if sum != bytes[4] {
            return Err(DhtError::ChecksumMismatch);
        }

        Ok(SensorFrame {
            humidity: bytes[0],
            humidity_frac: bytes[1],
            temperature: bytes[2],
            temperature_frac: bytes[3],
        })
    }

    /// Drives the line low past the 18 ms protocol minimum, releases it
    /// briefly, then leaves it to the sensor.
    fn send_start_signal(&mut self) -> Result<(), DhtError<P::Error>> {
        self.pin.set_low()?;
        self.delay.delay_ms(START_HOLD_MS);

        self.pin.set_high()?;
        self.delay.delay_us(START_RELEASE_US);

        Ok(())
    }

    /// Verifies the sensor's low-then-high acknowledgement pulses. Any
    /// deviation is `NoResponse`.
    fn check_response(&mut self) -> Result<(), DhtError<P::Error>> {
        self.delay.delay_us(RESPONSE_GUARD_US);
        if self.pin.is_low()? {
            self.delay.delay_us(RESPONSE_LOW_US);
            if self.pin.is_high()? {
                self.delay.delay_us(RESPONSE_HIGH_US);
                return Ok(());
            }
        }
        Err(DhtError::NoResponse)
    }

    /// Reads eight pulse-width encoded bits, MSB first.
    fn read_byte(&mut self) -> Result<u8, DhtError<P::Error>> {
        let mut byte = 0u8;

        for bit in 0..8 {
            // Rising edge marks the start of the bit's high pulse.
            self.wait_for(PinState::High)?;
            self.delay.delay_us(BIT_SAMPLE_US);

            // Still high past the sampling point: long pulse, bit is 1, and
            // the line has to fall before the next bit starts. A short pulse
            // has already ended, so the 0 case needs no further wait.
            if self.pin.is_high()? {
                byte |= 1 << (7 - bit);
                self.wait_for(PinState::Low)?;
            }
        }

        Ok(byte)
    }

    /// Polls the line until it reaches `state`, bounded by a deadline
    /// counter rather than a hardware timer.
    fn wait_for(&mut self, state: PinState) -> Result<(), DhtError<P::Error>> {
        for _ in 0..MAX_POLLS {
            let reached = match state {
                PinState::High => self.pin.is_high()?,
                PinState::Low => self.pin.is_low()?,
            };
            if reached {
                return Ok(());
            }
            self.delay.delay_us(POLL_STEP_US);
        }
        Err(DhtError::Timeout)
    }

    /// Releases the pin and delay provider.
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}
