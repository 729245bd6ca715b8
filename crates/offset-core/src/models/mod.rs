//! Data models shared across the controller

mod measurement;
mod thermostat;

pub use measurement::MeasurementBatch;
pub use thermostat::ThermostatInfo;
