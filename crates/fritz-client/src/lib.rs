//! FRITZ!Box smart-home client
//!
//! Logs in to the gateway with its challenge-response protocol (version 2,
//! PBKDF2-HMAC-SHA256 in two salted stages), keeps the resulting session id,
//! and reads/writes thermostat units through the smart-home REST API.
//!
//! # Example
//!
//! ```rust,no_run
//! use fritz_client::FritzClient;
//!
//! #[tokio::main]
//! async fn main() -> fritz_client::Result<()> {
//!     let mut client = FritzClient::new("http://fritz.box", "smarthome", "secret")?;
//!
//!     // Logs in on first use
//!     let info = client.thermostat_info("grouped-1234").await?;
//!     if info.offset != -1.0 {
//!         client.set_thermostat_offset(&info.id, -1.0).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module provides an in-process fake gateway:
//!
//! ```rust,ignore
//! use fritz_client::testing::{MockGateway, TestServer};
//!
//! let gateway = MockGateway::new("smarthome", "secret");
//! let server = TestServer::start(gateway.router()).await?;
//! let mut client = FritzClient::new(&server.base_url(), "smarthome", "secret")?;
//! ```

pub mod auth;
mod client;
mod error;
pub mod session;
pub mod testing;
pub mod types;
mod xml;

pub use auth::Challenge;
pub use client::FritzClient;
pub use error::{FritzError, Result};
pub use session::{Session, SessionId};
