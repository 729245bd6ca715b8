//! Thermostat state model

use serde::{Deserialize, Serialize};

/// Current state of one radiator thermostat.
///
/// Fetched fresh from the gateway on every control cycle and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatInfo {
    /// Gateway unit identifier
    pub id: String,
    /// Human-readable device name
    pub name: String,
    /// Reachable and neither in holiday nor summer mode
    pub active: bool,
    /// Raw sensor reading (`adapted_temp - offset`)
    pub measured_temp: f64,
    /// Reading with the current offset applied, as reported by the device
    pub adapted_temp: f64,
    /// Currently applied internal offset in °C
    pub offset: f64,
}

impl ThermostatInfo {
    /// Build from the values the gateway transmits.
    ///
    /// `measured_temp` is not transmitted by the gateway and is derived here.
    pub fn from_reported(
        id: impl Into<String>,
        name: impl Into<String>,
        active: bool,
        adapted_temp: f64,
        offset: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active,
            measured_temp: adapted_temp - offset,
            adapted_temp,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measured_temp_is_derived() {
        let info = ThermostatInfo::from_reported("u1", "Office", true, 20.5, -1.5);
        assert_eq!(info.measured_temp, 22.0);
        assert_eq!(info.adapted_temp, 20.5);
        assert_eq!(info.offset, -1.5);
    }
}
