//! LCD view rendering.
//!
//! The character display itself is an external collaborator, consumed
//! through the narrow [`DisplayAdapter`] interface. Both views do a full
//! clear-and-redraw; there is no partial update or diffing, and the render
//! paths are short enough to run with interrupts suppressed.

use heapless::String;
use ufmt::uwrite;

use crate::dht11::{ErrorState, SensorFrame};
use crate::moisture::PumpCommand;

/// Cursor positioning and raw character output, assumed synchronous and
/// side-effect-free beyond the glass. No return status.
pub trait DisplayAdapter {
    fn clear(&mut self);
    fn set_cursor(&mut self, row: u8, col: u8);
    fn print(&mut self, text: &str);
}

/// Renders the temperature/humidity view: two fixed-width lines when a valid
/// frame exists, otherwise the one-line message for the recorded error.
pub fn render_sensor_view<D: DisplayAdapter>(
    display: &mut D,
    frame: Option<&SensorFrame>,
    error: ErrorState,
) {
    display.clear();
    display.set_cursor(0, 0);

    match frame {
        Some(frame) => {
            let mut line: String<16> = String::new();
            uwrite!(
                line,
                "Temp = {}.{} C",
                pad_number(frame.temperature).as_str(),
                frame.temperature_frac
            )
            .unwrap();
            display.print(&line);

            line.clear();
            display.set_cursor(1, 0);
            uwrite!(
                line,
                "RH   = {}.{} %",
                pad_number(frame.humidity).as_str(),
                frame.humidity_frac
            )
            .unwrap();
            display.print(&line);
        }
        None => display.print(match error {
            ErrorState::NoResponse => "No response",
            ErrorState::Timeout => "Time out!",
            ErrorState::ChecksumMismatch => "Checksum error",
            ErrorState::None => "DHT11 Error",
        }),
    }
}

/// Renders the moisture view: percentage on top, logical pump state below.
/// The relay line is active-low, so the text reflects the command, not the
/// drive level.
pub fn render_moisture_view<D: DisplayAdapter>(display: &mut D, percent: u8, pump: PumpCommand) {
    display.clear();

    let mut line: String<16> = String::new();
    uwrite!(line, "Moisture: {}%", percent).unwrap();
    display.set_cursor(0, 0);
    display.print(&line);

    display.set_cursor(1, 0);
    display.print(match pump {
        PumpCommand::On => "Pump: ON",
        PumpCommand::Off => "Pump: OFF",
    });
}

/// Pads a number with a zero before it if < 10.
/// Sized for the full byte range; a three digit reading simply widens the
/// line instead of failing the write.
fn pad_number(num: u8) -> String<3> {
    let mut padded = String::new();
    if num < 10 {
        uwrite!(padded, "0{}", num).unwrap();
    } else {
        uwrite!(padded, "{}", num).unwrap();
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::string::{String as StdString, ToString};
    use std::vec::Vec;

    /// Records the operations a render pass issues, in order.
    #[derive(Default)]
    struct RecordingDisplay {
        ops: Vec<StdString>,
    }

    impl DisplayAdapter for RecordingDisplay {
        fn clear(&mut self) {
            self.ops.push("clear".to_string());
        }

        fn set_cursor(&mut self, row: u8, col: u8) {
            self.ops.push(std::format!("cursor {},{}", row, col));
        }

        fn print(&mut self, text: &str) {
            self.ops.push(std::format!("print {}", text));
        }
    }

    #[test]
    fn sensor_view_patches_digits_into_fixed_width_lines() {
        let mut display = RecordingDisplay::default();
        let frame = SensorFrame {
            humidity: 45,
            humidity_frac: 2,
            temperature: 27,
            temperature_frac: 0,
        };

        render_sensor_view(&mut display, Some(&frame), ErrorState::None);

        assert_eq!(
            display.ops,
            [
                "clear",
                "cursor 0,0",
                "print Temp = 27.0 C",
                "cursor 1,0",
                "print RH   = 45.2 %",
            ]
        );
    }

    #[test]
    fn single_digit_readings_are_zero_padded() {
        let mut display = RecordingDisplay::default();
        let frame = SensorFrame {
            humidity: 9,
            humidity_frac: 0,
            temperature: 4,
            temperature_frac: 5,
        };

        render_sensor_view(&mut display, Some(&frame), ErrorState::None);

        assert!(display.ops.contains(&"print Temp = 04.5 C".to_string()));
        assert!(display.ops.contains(&"print RH   = 09.0 %".to_string()));
    }

    #[test]
    fn three_digit_readings_render_without_failing() {
        // 100 + 0 + 25 + 0 checksums cleanly, so saturated-humidity frames
        // reach the render path and must not take the loop down.
        let mut display = RecordingDisplay::default();
        let frame = SensorFrame {
            humidity: 100,
            humidity_frac: 0,
            temperature: 25,
            temperature_frac: 0,
        };

        render_sensor_view(&mut display, Some(&frame), ErrorState::None);

        assert!(display.ops.contains(&"print Temp = 25.0 C".to_string()));
        assert!(display.ops.contains(&"print RH   = 100.0 %".to_string()));
    }

    #[test]
    fn each_error_kind_gets_its_own_message() {
        for (error, message) in [
            (ErrorState::NoResponse, "print No response"),
            (ErrorState::Timeout, "print Time out!"),
            (ErrorState::ChecksumMismatch, "print Checksum error"),
            (ErrorState::None, "print DHT11 Error"),
        ] {
            let mut display = RecordingDisplay::default();
            render_sensor_view(&mut display, None, error);
            assert_eq!(display.ops, ["clear", "cursor 0,0", message]);
        }
    }

    #[test]
    fn moisture_view_shows_percentage_and_pump_state() {
        let mut display = RecordingDisplay::default();

        render_moisture_view(&mut display, 37, PumpCommand::On);

        assert_eq!(
            display.ops,
            ["clear", "cursor 0,0", "print Moisture: 37%", "cursor 1,0", "print Pump: ON"]
        );
    }

    #[test]
    fn pump_text_follows_the_logical_command() {
        let mut display = RecordingDisplay::default();
        render_moisture_view(&mut display, 80, PumpCommand::Off);
        assert_eq!(display.ops.last().unwrap(), "print Pump: OFF");
    }
}
