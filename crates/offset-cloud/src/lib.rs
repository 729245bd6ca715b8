//! Cloud collaborators of the offset controller
//!
//! - [`NetatmoClient`] reads the room temperature from a Netatmo weather
//!   station, refreshing its OAuth access token when it is about to expire.
//! - [`ThingSpeakClient`] publishes the per-run measurement batch to a
//!   ThingSpeak channel.

mod error;
pub mod netatmo;
pub mod thingspeak;

pub use error::{CloudError, Result};
pub use netatmo::{NetatmoClient, NetatmoCredentials};
pub use thingspeak::ThingSpeakClient;
