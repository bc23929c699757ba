//! RP2040 bring-up and the cooperative foreground loop.
//!
//! Two interrupt sources feed the shared state: the ADC FIFO (free-running
//! soil conversions) and timer alarm 0 (the 1 Hz tick that drives the
//! display mode). Everything else, including every external side effect,
//! happens in the loop below.

use core::cell::RefCell;

use cortex_m::singleton;
use critical_section::Mutex;
use defmt::{info, warn};
use defmt_rtt as _;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use hd44780_driver::HD44780;
use panic_probe as _;

// Provide an alias for our BSP so we can switch targets quickly.
use rp_pico as bsp;

use bsp::entry;
use bsp::hal::{
    self,
    adc::{Adc, AdcFifo, AdcPin},
    clocks::init_clocks_and_plls,
    fugit::ExtU32,
    gpio::InOutPin,
    pac,
    pac::interrupt,
    timer::{Alarm, Alarm0},
    watchdog::Watchdog,
    Timer,
};

use soilnode_rs::dht11::{Dht11, ErrorState, SensorFrame};
use soilnode_rs::display::{self, DisplayAdapter};
use soilnode_rs::moisture::{self, Moisture, PumpCommand};
use soilnode_rs::shared::{self, DisplayMode};
use soilnode_rs::timer::{
    IntervalCounter, DECODE_EVERY_N_LOOPS, DECODE_SETTLE_MS, LOOP_DELAY_MS, TICK_PERIOD_MS,
};

static TICK_ALARM: Mutex<RefCell<Option<Alarm0>>> = Mutex::new(RefCell::new(None));
static ADC_FIFO: Mutex<RefCell<Option<AdcFifo<'static, u16>>>> = Mutex::new(RefCell::new(None));

/// ~1 kHz conversion cadence off the 48 MHz ADC clock. The FIFO re-arms
/// itself; the foreground never triggers a conversion.
const ADC_CLOCK_DIV: u16 = 47_999;

#[entry]
fn main() -> ! {
    info!("soilnode starting");
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();
    let _core = pac::CorePeripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    //
    // The default is to generate a 125 MHz system clock
    let clocks = init_clocks_and_plls(
        bsp::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = hal::Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // Set up the HD44780 in 4-bit mode
    let driver = HD44780::new_4bit(
        pins.gpio0.into_push_pull_output(),
        pins.gpio1.into_push_pull_output(),
        pins.gpio2.into_push_pull_output(),
        pins.gpio3.into_push_pull_output(),
        pins.gpio4.into_push_pull_output(),
        pins.gpio5.into_push_pull_output(),
        &mut timer,
    )
    .unwrap();
    let mut lcd = LcdDisplay {
        driver,
        delay: timer,
    };

    // Set up the pump relay; the line is active-low, so high is off
    let mut pump = pins.gpio16.into_push_pull_output();
    pump.set_high().unwrap();

    // Set up the DHT11 data line as an emulated open-drain pin
    let dht_pin = InOutPin::new(pins.gpio15.into_pull_up_input());
    let mut dht = Dht11::new(dht_pin, timer);

    // Set up the free-running ADC on the moisture probe. The FIFO has to
    // outlive `main` so the interrupt handler can drain it.
    let adc = singleton!(: Adc = Adc::new(pac.ADC, &mut pac.RESETS)).unwrap();
    let mut adc_pin = AdcPin::new(pins.gpio26.into_floating_input()).unwrap();
    let fifo = adc
        .build_fifo()
        .clock_divider(ADC_CLOCK_DIV, 0)
        .set_channel(&mut adc_pin)
        .enable_interrupt(1)
        .start();
    critical_section::with(|cs| ADC_FIFO.borrow(cs).replace(Some(fifo)));

    // Arm the 1 Hz tick
    let mut alarm = timer.alarm_0().unwrap();
    alarm.schedule((TICK_PERIOD_MS * 1_000).micros()).unwrap();
    alarm.enable_interrupt();
    critical_section::with(|cs| TICK_ALARM.borrow(cs).replace(Some(alarm)));

    lcd.clear();
    lcd.set_cursor(0, 0);
    lcd.print("Initializing...");
    timer.delay_ms(1_000);

    unsafe {
        pac::NVIC::unmask(pac::Interrupt::ADC_IRQ_FIFO);
        pac::NVIC::unmask(pac::Interrupt::TIMER_IRQ_0);
    }

    info!("soilnode ready");

    let mut decode_cadence = IntervalCounter::new(DECODE_EVERY_N_LOOPS);
    let mut frame: Option<SensorFrame> = None;
    let mut error = ErrorState::None;
    let mut latest = Moisture::default();

    loop {
        // Consume the pending soil sample, if the ADC posted one
        if let Some(raw) = shared::take_sample() {
            latest = moisture::evaluate(raw);
            match latest.pump {
                PumpCommand::On => pump.set_low().unwrap(),
                PumpCommand::Off => pump.set_high().unwrap(),
            }
            info!("moisture {}% (raw {})", latest.percent, raw);
        }

        // Poll the DHT11 at its coarser cadence. The exchange owns the bus
        // and the CPU; interrupts stay masked for its whole duration.
        if decode_cadence.advance() {
            match cortex_m::interrupt::free(|_| dht.read()) {
                Ok(decoded) => {
                    frame = Some(decoded);
                    error = ErrorState::None;
                }
                Err(e) => {
                    frame = None;
                    error = ErrorState::from(&e);
                    warn!("DHT11 read failed: {}", defmt::Debug2Format(&e));
                }
            }
            timer.delay_ms(DECODE_SETTLE_MS);
        }

        // Render whichever view the tick source has selected
        cortex_m::interrupt::free(|_| match shared::display_mode() {
            DisplayMode::Sensor => display::render_sensor_view(&mut lcd, frame.as_ref(), error),
            DisplayMode::Moisture => {
                display::render_moisture_view(&mut lcd, latest.percent, latest.pump)
            }
        });

        timer.delay_ms(LOOP_DELAY_MS);
    }
}

/// Narrow adapter from the [`DisplayAdapter`] contract onto the HD44780
/// driver. Row addressing follows the 16x2 DDRAM layout.
struct LcdDisplay<B: hd44780_driver::bus::DataBus> {
    driver: HD44780<B>,
    delay: Timer,
}

impl<B: hd44780_driver::bus::DataBus> DisplayAdapter for LcdDisplay<B> {
    fn clear(&mut self) {
        self.driver.clear(&mut self.delay).unwrap();
    }

    fn set_cursor(&mut self, row: u8, col: u8) {
        // Line 0 starts at DDRAM 0x00, line 1 at 0x40
        self.driver
            .set_cursor_pos(row * 0x40 + col, &mut self.delay)
            .unwrap();
    }

    fn print(&mut self, text: &str) {
        self.driver.write_str(text, &mut self.delay).unwrap();
    }
}

/// Drains completed conversions and re-publishes the newest one. The FIFO
/// keeps converting on its own; nothing here re-arms it.
#[interrupt]
fn ADC_IRQ_FIFO() {
    let mut newest = None;
    critical_section::with(|cs| {
        if let Some(fifo) = ADC_FIFO.borrow_ref_mut(cs).as_mut() {
            while fifo.len() > 0 {
                newest = Some(fifo.read());
            }
        }
    });
    if let Some(raw) = newest {
        shared::publish_sample(raw);
    }
}

/// The ~1 Hz timing source: advance the shared tick and re-arm the alarm.
#[interrupt]
fn TIMER_IRQ_0() {
    critical_section::with(|cs| {
        if let Some(alarm) = TICK_ALARM.borrow_ref_mut(cs).as_mut() {
            alarm.clear_interrupt();
            alarm.schedule((TICK_PERIOD_MS * 1_000).micros()).ok();
        }
    });
    shared::tick();
}
