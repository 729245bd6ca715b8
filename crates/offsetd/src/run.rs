//! One control run over all configured thermostats

use offset_core::{
    compute_offset, needs_update, ControlError, ControlResult, MeasurementBatch, TelemetrySink,
    TemperatureSource, ThermostatGateway,
};
use tracing::{debug, info, instrument};

/// A thermostat whose offset was written during the run
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedDevice {
    pub id: String,
    pub name: String,
    pub from: f64,
    pub to: f64,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Room temperature the offsets were computed against
    pub temperature: f64,
    /// The batch handed to the telemetry sink
    pub batch: MeasurementBatch,
    pub changed: Vec<ChangedDevice>,
}

/// Align every listed thermostat with the room temperature and publish the
/// resulting measurements.
///
/// Devices are processed in the given order. Any failure aborts the run;
/// offsets written before the failure stay in place.
#[instrument(skip_all, fields(devices = devices.len()))]
pub async fn run(
    devices: &[String],
    gateway: &mut dyn ThermostatGateway,
    weather: &mut dyn TemperatureSource,
    sink: &dyn TelemetrySink,
) -> ControlResult<RunReport> {
    if devices.is_empty() {
        return Err(ControlError::NoDevices);
    }

    let temperature = weather.temperature().await?.ok_or(ControlError::NoTemperature)?;
    debug!(temperature, "Room temperature");

    let mut batch = MeasurementBatch::new();
    let mut changed = Vec::new();

    for id in devices {
        let info = gateway.thermostat_info(id).await?;
        let offset = compute_offset(&info, temperature);
        batch.push_device(offset, info.adapted_temp);

        if !needs_update(&info, offset) {
            debug!(device = %id, offset, "Offset unchanged");
            continue;
        }

        gateway.set_thermostat_offset(id, offset).await?;
        info!(
            device = %id,
            name = %info.name,
            from = info.offset,
            to = offset,
            "Change offset for \"{}\" from {}°C to {}°C",
            info.name,
            info.offset,
            offset
        );
        changed.push(ChangedDevice {
            id: id.clone(),
            name: info.name,
            from: info.offset,
            to: offset,
        });
    }

    batch.push_ambient(temperature);
    sink.publish(&batch).await?;

    Ok(RunReport {
        temperature,
        batch,
        changed,
    })
}
