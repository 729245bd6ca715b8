//! offsetd - Thermostat offset controller
//!
//! Reads the room temperature from a Netatmo weather station, compares it
//! with what each FRITZ!Box thermostat measures next to its radiator, writes
//! a corrective offset into every thermostat that needs one, and publishes
//! the measurements to a ThingSpeak channel.
//!
//! The binary runs [`run`] once per invocation; scheduling is left to cron or
//! a systemd timer.

pub mod config;
mod run;

pub use config::{Cli, Config, FileConfig};
pub use run::{run, ChangedDevice, RunReport};
