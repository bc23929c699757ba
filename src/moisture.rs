//! Soil moisture evaluation and pump decision.
//!
//! The resistive probe reads high when dry, so the raw 10-bit conversion is
//! mapped across an inverted, clamped domain: 1023 (air) is 0 % and 278 (in
//! water) is 100 %.

/// Calibrated raw reading with the probe in air (fully dry).
pub const RAW_DRY: u16 = 1023;
/// Calibrated raw reading with the probe in water (fully wet).
pub const RAW_WET: u16 = 278;

/// The pump engages below this moisture percentage.
///
/// There is deliberately no hysteresis band; readings oscillating around the
/// threshold will chatter the relay, matching the deployed behaviour.
pub const PUMP_ON_BELOW: u8 = 40;

/// Logical pump state. The relay line itself is active-low; translating to a
/// drive level is the firmware's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpCommand {
    On,
    #[default]
    Off,
}

/// One evaluated sample: bounded percentage plus the actuation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Moisture {
    pub percent: u8,
    pub pump: PumpCommand,
}

/// Maps a raw conversion onto [0, 100], inverted and clamped.
pub fn percent_from_raw(raw: u16) -> u8 {
    let clamped = raw.clamp(RAW_WET, RAW_DRY);
    let span = (RAW_DRY - RAW_WET) as u32;
    ((RAW_DRY - clamped) as u32 * 100 / span) as u8
}

/// Threshold rule: engage the pump iff the soil is drier than the cutoff.
/// Purely a function of the current sample, no memory.
pub fn pump_command(percent: u8) -> PumpCommand {
    if percent < PUMP_ON_BELOW {
        PumpCommand::On
    } else {
        PumpCommand::Off
    }
}

/// Evaluates one consumed sample end to end.
pub fn evaluate(raw: u16) -> Moisture {
    let percent = percent_from_raw(raw);
    Moisture {
        percent,
        pump: pump_command(percent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_endpoints_map_to_the_extremes() {
        assert_eq!(percent_from_raw(RAW_DRY), 0);
        assert_eq!(percent_from_raw(RAW_WET), 100);
    }

    #[test]
    fn readings_outside_the_domain_clamp_into_range() {
        assert_eq!(percent_from_raw(u16::MAX), 0);
        assert_eq!(percent_from_raw(1024), 0);
        assert_eq!(percent_from_raw(277), 100);
        assert_eq!(percent_from_raw(0), 100);
    }

    #[test]
    fn mapping_is_monotonically_non_increasing() {
        let mut previous = percent_from_raw(0);
        for raw in 1..=1100u16 {
            let percent = percent_from_raw(raw);
            assert!(percent <= previous, "raw {} rose to {}%", raw, percent);
            assert!(percent <= 100);
            previous = percent;
        }
    }

    #[test]
    fn midpoint_follows_the_exact_linear_formula() {
        // (1023 - 650) * 100 / 745, truncating.
        assert_eq!(percent_from_raw(650), 50);
    }

    #[test]
    fn pump_engages_strictly_below_the_threshold() {
        assert_eq!(pump_command(39), PumpCommand::On);
        assert_eq!(pump_command(40), PumpCommand::Off);
        assert_eq!(pump_command(41), PumpCommand::Off);
        assert_eq!(pump_command(0), PumpCommand::On);
        assert_eq!(pump_command(100), PumpCommand::Off);
    }

    #[test]
    fn threshold_has_no_hysteresis_so_the_relay_chatters() {
        // 39 -> 41 -> 39 flips the pump every time; known chattering risk.
        assert_eq!(pump_command(39), PumpCommand::On);
        assert_eq!(pump_command(41), PumpCommand::Off);
        assert_eq!(pump_command(39), PumpCommand::On);
    }

    #[test]
    fn end_to_end_samples_from_calibration() {
        let wet = evaluate(278);
        assert_eq!(wet.percent, 100);
        assert_eq!(wet.pump, PumpCommand::Off);

        let dry = evaluate(1023);
        assert_eq!(dry.percent, 0);
        assert_eq!(dry.pump, PumpCommand::On);

        let mid = evaluate(650);
        assert_eq!(mid.percent, 50);
        assert_eq!(mid.pump, PumpCommand::Off);
    }
}
