//! Collaborator traits driven by the orchestrator
//!
//! Every method takes `&mut self` where the implementation keeps session or
//! token state. One run drives each collaborator strictly sequentially.

use async_trait::async_trait;

use crate::error::ControlResult;
use crate::models::{MeasurementBatch, ThermostatInfo};

/// Access to the thermostats behind the smart-home gateway.
///
/// Implementations authenticate lazily before each call.
#[async_trait]
pub trait ThermostatGateway: Send {
    /// Fetch the current state of one thermostat
    async fn thermostat_info(&mut self, id: &str) -> ControlResult<ThermostatInfo>;

    /// Switch the thermostat to its internal sensor with the given offset
    async fn set_thermostat_offset(&mut self, id: &str, offset: f64) -> ControlResult<()>;
}

/// Source of the ambient room temperature
#[async_trait]
pub trait TemperatureSource: Send {
    /// Current room temperature in °C, `None` if no compatible station is reachable
    async fn temperature(&mut self) -> ControlResult<Option<f64>>;
}

/// Receiver of the per-run measurement batch
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn publish(&self, batch: &MeasurementBatch) -> ControlResult<()>;
}
