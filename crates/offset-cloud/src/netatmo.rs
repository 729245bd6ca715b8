//! Netatmo weather station client
//!
//! Authenticates with a long-lived refresh token and reads the indoor
//! temperature of the first reachable base station (`NAMain`).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use offset_core::{ControlError, ControlResult, TemperatureSource};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{extract_error, CloudError, Result};

/// Public Netatmo API
pub const NETATMO_API: &str = "https://api.netatmo.com";

/// Station type of the indoor base module
const BASE_STATION_TYPE: &str = "NAMain";

/// Refresh the access token this long before it expires
const EXPIRY_MARGIN_SECS: i64 = 60;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const SERVICE: &str = "Netatmo";

/// OAuth client credentials and refresh token
#[derive(Clone)]
pub struct NetatmoCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl fmt::Debug for NetatmoCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetatmoCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .checked_sub_signed(TimeDelta::seconds(EXPIRY_MARGIN_SECS))
            .is_some_and(|deadline| now < deadline)
    }
}

/// Absolute expiry of a token valid for `expires_in` seconds from `now`
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>> {
    TimeDelta::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            CloudError::ParseError(format!("Token lifetime out of range: {}s", expires_in))
        })
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    /// Netatmo may rotate the refresh token
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct StationsResponse {
    body: StationsBody,
}

#[derive(Deserialize)]
struct StationsBody {
    #[serde(default)]
    devices: Vec<Station>,
}

#[derive(Deserialize)]
struct Station {
    #[serde(rename = "type", default)]
    station_type: String,
    #[serde(default)]
    reachable: bool,
    #[serde(default)]
    dashboard_data: Option<DashboardData>,
}

#[derive(Deserialize)]
struct DashboardData {
    #[serde(rename = "Temperature", default)]
    temperature: Option<f64>,
}

/// Netatmo weather station client
pub struct NetatmoClient {
    client: Client,
    base_url: Url,
    credentials: NetatmoCredentials,
    token: Option<AccessToken>,
}

impl NetatmoClient {
    /// Create a client for `base_url` (normally [`NETATMO_API`]) with a request timeout
    pub fn with_config(
        base_url: &str,
        credentials: NetatmoCredentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            credentials,
            token: None,
        })
    }

    /// Refresh the access token if there is none or it is about to expire
    pub async fn ensure_authenticated(&mut self) -> Result<()> {
        let fresh = self
            .token
            .as_ref()
            .is_some_and(|t| t.is_fresh(Utc::now()));
        if !fresh {
            self.authenticate().await?;
        }
        Ok(())
    }

    async fn authenticate(&mut self) -> Result<()> {
        let url = self.base_url.join("/oauth2/token")?;
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
        ];

        let response = self.client.post(url).form(&params).send().await?;
        if !response.status().is_success() {
            return Err(extract_error(SERVICE, response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CloudError::ParseError(e.to_string()))?;

        let expires_at = expiry_after(Utc::now(), token.expires_in)?;
        if let Some(rotated) = token.refresh_token {
            self.credentials.refresh_token = rotated;
        }
        self.token = Some(AccessToken {
            value: token.access_token,
            expires_at,
        });

        info!(expires_in = token.expires_in, "Refreshed Netatmo access token");
        Ok(())
    }

    /// Indoor temperature of the first reachable base station.
    ///
    /// `None` if no reachable base station reports a temperature.
    #[instrument(skip(self))]
    pub async fn temperature(&mut self) -> Result<Option<f64>> {
        self.ensure_authenticated().await?;
        let token = self
            .token
            .as_ref()
            .map(|t| t.value.as_str())
            .unwrap_or_default();

        let url = self.base_url.join("/api/getstationsdata")?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(extract_error(SERVICE, response).await);
        }

        let stations: StationsResponse = response
            .json()
            .await
            .map_err(|e| CloudError::ParseError(e.to_string()))?;

        let temperature = base_station_temperature(&stations.body.devices);
        debug!(?temperature, "Read room temperature");
        Ok(temperature)
    }
}

fn base_station_temperature(devices: &[Station]) -> Option<f64> {
    devices
        .iter()
        .find(|d| d.reachable && d.station_type == BASE_STATION_TYPE)
        .and_then(|d| d.dashboard_data.as_ref())
        .and_then(|data| data.temperature)
}

#[async_trait]
impl TemperatureSource for NetatmoClient {
    async fn temperature(&mut self) -> ControlResult<Option<f64>> {
        NetatmoClient::temperature(self)
            .await
            .map_err(ControlError::from)
    }
}
