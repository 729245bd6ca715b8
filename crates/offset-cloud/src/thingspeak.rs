//! ThingSpeak channel publisher

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use offset_core::{ControlError, ControlResult, MeasurementBatch, TelemetrySink};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{extract_error, Result};

/// Public ThingSpeak API
pub const THINGSPEAK_API: &str = "https://api.thingspeak.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const SERVICE: &str = "ThingSpeak";

/// Publishes ordered values as `field1..fieldN` of one channel
pub struct ThingSpeakClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for ThingSpeakClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThingSpeakClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ThingSpeakClient {
    /// Create a client for the public ThingSpeak API
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config(THINGSPEAK_API, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client for a custom base URL and request timeout
    pub fn with_config(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            api_key: api_key.to_string(),
        })
    }

    /// Publish `fields` as one channel update.
    ///
    /// Position `i` (0-based) becomes `field{i + 1}`.
    #[instrument(skip(self))]
    pub async fn publish(&self, fields: &[f64]) -> Result<()> {
        let body = update_body(&self.api_key, fields);

        let url = self.base_url.join("/update.json")?;
        let response = self.client.post(url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(extract_error(SERVICE, response).await);
        }

        debug!(fields = fields.len(), "Published channel update");
        Ok(())
    }
}

fn update_body(api_key: &str, fields: &[f64]) -> Value {
    let mut body = Map::new();
    body.insert("api_key".to_string(), Value::from(api_key));
    for (index, value) in fields.iter().enumerate() {
        body.insert(format!("field{}", index + 1), Value::from(*value));
    }
    Value::Object(body)
}

#[async_trait]
impl TelemetrySink for ThingSpeakClient {
    async fn publish(&self, batch: &MeasurementBatch) -> ControlResult<()> {
        ThingSpeakClient::publish(self, batch.values())
            .await
            .map_err(ControlError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fields_are_numbered_from_one() {
        let body = update_body("KEY", &[-1.5, 21.0, 20.4]);
        assert_eq!(
            body,
            serde_json::json!({
                "api_key": "KEY",
                "field1": -1.5,
                "field2": 21.0,
                "field3": 20.4
            })
        );
    }

    #[test]
    fn test_every_value_gets_a_field() {
        let values: Vec<f64> = (0..11).map(f64::from).collect();
        let body = update_body("KEY", &values);

        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 12);
        assert_eq!(object["field11"], serde_json::json!(10.0));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = ThingSpeakClient::new("WRITEKEY123").unwrap();
        assert!(!format!("{:?}", client).contains("WRITEKEY123"));
    }
}
