//! Offset control algorithm
//!
//! The thermostat regulates against its own sensor, which sits next to the
//! radiator and reads warmer than the room. The controller compares that
//! reading with the room temperature from the weather station and pushes a
//! negative offset into the thermostat so it regulates against the room.
//!
//! Rounding step and clamp bounds are fixed business rules.

use crate::models::ThermostatInfo;

/// Offset granularity accepted by the thermostat, in °C
pub const OFFSET_STEP: f64 = 0.5;
/// Largest downward correction ever requested
pub const MIN_OFFSET: f64 = -3.0;
/// The controller never requests warming through the offset
pub const MAX_OFFSET: f64 = 0.0;

/// Round to the nearest offset step, halves away from zero
fn round_to_step(value: f64) -> f64 {
    (value / OFFSET_STEP).round() * OFFSET_STEP
}

/// Compute the offset a thermostat should carry for the given room temperature.
///
/// Inactive devices get exactly `0.0`, which clears any earlier correction.
/// For active devices the raw difference is rounded to [`OFFSET_STEP`] first
/// and clamped to `[MIN_OFFSET, MAX_OFFSET]` afterwards.
pub fn compute_offset(info: &ThermostatInfo, room_temperature: f64) -> f64 {
    if !info.active {
        return 0.0;
    }

    let raw = room_temperature - info.measured_temp;
    // `+ 0.0` turns a rounded -0.0 into 0.0
    round_to_step(raw).clamp(MIN_OFFSET, MAX_OFFSET) + 0.0
}

/// Whether the device must be written. Exact comparison, no tolerance band.
pub fn needs_update(info: &ThermostatInfo, new_offset: f64) -> bool {
    new_offset != info.offset
}
