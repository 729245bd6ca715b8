//! offset-core - Core types for the thermostat offset controller
//!
//! This crate holds what every other crate agrees on: the thermostat state
//! model, the measurement batch published as telemetry, the offset control
//! algorithm, and the traits the orchestrator drives its collaborators
//! through (gateway, weather source, telemetry sink).

pub mod backend;
pub mod control;
pub mod error;
pub mod models;

pub use backend::{TelemetrySink, TemperatureSource, ThermostatGateway};
pub use control::{compute_offset, needs_update, MAX_OFFSET, MIN_OFFSET, OFFSET_STEP};
pub use error::{ControlError, ControlResult};
pub use models::*;
