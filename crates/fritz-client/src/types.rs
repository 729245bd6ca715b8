//! Smart-home REST API types (`/api/v0/smarthome/configuration/units/{id}`)
//!
//! Only the fields the controller uses are modelled. Unknown fields are
//! ignored; missing flags deserialize as `None`.

use serde::{Deserialize, Serialize};

/// Sensor mode that makes the thermostat apply `internalOffset`
pub const SENSOR_MODE_INTERNAL: &str = "internal";

/// Configuration unit as returned by the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(rename = "UID", default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connected: Option<bool>,
    #[serde(default)]
    pub interfaces: UnitInterfaces,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitInterfaces {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_interface: Option<TemperatureInterface>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermostat_interface: Option<ThermostatInterface>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemperatureInterface {
    /// Temperature with the current offset applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub celsius: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_holiday_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_summertime_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_offset: Option<TemperatureOffset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureOffset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_offset: Option<f64>,
}

/// PUT body switching a thermostat to its internal sensor with an offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetUpdate {
    pub interfaces: OffsetUpdateInterfaces,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetUpdateInterfaces {
    pub thermostat_interface: OffsetUpdateThermostat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetUpdateThermostat {
    pub temperature_offset: TemperatureOffset,
}

impl OffsetUpdate {
    pub fn internal(offset: f64) -> Self {
        Self {
            interfaces: OffsetUpdateInterfaces {
                thermostat_interface: OffsetUpdateThermostat {
                    temperature_offset: TemperatureOffset {
                        sensor_mode: Some(SENSOR_MODE_INTERNAL.to_string()),
                        internal_offset: Some(offset),
                    },
                },
            },
        }
    }

    pub fn offset(&self) -> Option<f64> {
        self.interfaces
            .thermostat_interface
            .temperature_offset
            .internal_offset
    }
}
