//! Gateway HTTP client with session handling

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use offset_core::{ControlError, ControlResult, ThermostatGateway, ThermostatInfo};
use reqwest::{Client, Method};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::auth::Challenge;
use crate::error::{FritzError, Result};
use crate::session::Session;
use crate::types::{OffsetUpdate, Unit};
use crate::xml;

/// Login endpoint; also hands out challenges
const LOGIN_PATH: &str = "/login_sid.lua";
/// Smart-home configuration units
const UNITS_PATH: &str = "/api/v0/smarthome/configuration/units";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Challenge as fetched from the gateway, before version checks
struct ChallengeInfo {
    challenge: String,
    block_time: Option<u64>,
}

/// FRITZ!Box smart-home client.
///
/// Owns the session for one gateway. The session is established lazily by
/// [`ensure_authenticated`](Self::ensure_authenticated) and mutated only
/// through `&mut self`, so one client must not be shared between concurrent
/// tasks.
pub struct FritzClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
    session: Session,
}

impl fmt::Debug for FritzClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FritzClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl FritzClient {
    /// Create a new gateway client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the gateway (e.g., "http://fritz.box")
    /// * `username` - Gateway user with smart-home rights
    /// * `password` - Password of that user
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        Self::with_config(
            base_url,
            username,
            password,
            DEFAULT_TIMEOUT,
            DEFAULT_CONNECT_TIMEOUT,
        )
    }

    /// Create a new gateway client with custom timeouts
    pub fn with_config(
        base_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url,
            username: username.to_string(),
            password: password.to_string(),
            session: Session::Unauthenticated,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Log in unless a session is already held.
    ///
    /// Expiry is not detected here: a stale session surfaces as a failed
    /// request later and is not retried.
    #[instrument(skip(self))]
    pub async fn ensure_authenticated(&mut self) -> Result<()> {
        if self.session.is_authenticated() {
            return Ok(());
        }
        self.login().await
    }

    async fn login(&mut self) -> Result<()> {
        let ChallengeInfo {
            challenge,
            block_time,
        } = self.fetch_challenge().await?;

        if let Some(seconds) = block_time.filter(|&s| s > 0) {
            warn!(seconds, "Gateway login blocked");
            return Err(FritzError::Lockout { seconds });
        }

        let challenge: Challenge = challenge.parse()?;
        debug!(
            iterations1 = challenge.iterations1,
            iterations2 = challenge.iterations2,
            "Answering login challenge"
        );
        let response = challenge.response(&self.password);

        let mut url = self.base_url.join(LOGIN_PATH)?;
        url.query_pairs_mut()
            .append_pair("username", &self.username)
            .append_pair("response", &response);

        let login = self.client.get(url).send().await?;
        if !login.status().is_success() {
            return Err(extract_error(login).await);
        }

        let body = login.text().await?;
        let sid = xml::leaf_text(&body, "SID").ok_or_else(|| {
            FritzError::ParseError("Could not parse SID from gateway response".to_string())
        })?;

        self.session = Session::from_sid(sid);
        if !self.session.is_authenticated() {
            warn!(username = %self.username, "Gateway rejected credentials");
            return Err(FritzError::AuthFailed);
        }

        info!(username = %self.username, "Logged in to gateway");
        Ok(())
    }

    async fn fetch_challenge(&self) -> Result<ChallengeInfo> {
        let mut url = self.base_url.join(LOGIN_PATH)?;
        url.set_query(Some("version=2"));

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(extract_error(response).await);
        }

        let body = response.text().await?;
        let challenge = xml::leaf_text(&body, "Challenge")
            .ok_or_else(|| {
                FritzError::ParseError("Could not parse challenge from gateway response".to_string())
            })?
            .to_string();

        let block_time = xml::leaf_text(&body, "BlockTime")
            .map(|raw| {
                raw.parse::<u64>().map_err(|_| {
                    FritzError::ParseError(format!("Invalid BlockTime in gateway response: {:?}", raw))
                })
            })
            .transpose()?;

        Ok(ChallengeInfo {
            challenge,
            block_time,
        })
    }

    /// Issue a request carrying the current session id.
    ///
    /// Callers must call [`ensure_authenticated`](Self::ensure_authenticated)
    /// first; without a session this fails with `NotAuthenticated` and sends
    /// nothing. Non-success statuses are turned into `ServerError`.
    #[instrument(skip(self, body))]
    pub async fn authorized_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let sid = self.session.id().ok_or(FritzError::NotAuthenticated)?;
        let url = self.base_url.join(path)?;

        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, format!("AVM-SID {}", sid.as_str()));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(extract_error(response).await)
        }
    }

    // =========================================================================
    // Thermostats
    // =========================================================================

    /// Fetch the current state of one thermostat
    #[instrument(skip(self))]
    pub async fn thermostat_info(&mut self, id: &str) -> Result<ThermostatInfo> {
        self.ensure_authenticated().await?;

        let response = self
            .authorized_request(Method::GET, &unit_path(id), None)
            .await?;
        let unit: Unit = response
            .json()
            .await
            .map_err(|e| FritzError::ParseError(e.to_string()))?;

        let info = unit_to_info(id, unit)?;
        debug!(
            name = %info.name,
            active = info.active,
            adapted = info.adapted_temp,
            offset = info.offset,
            "Fetched thermostat"
        );
        Ok(info)
    }

    /// Switch a thermostat to its internal sensor with the given offset
    #[instrument(skip(self))]
    pub async fn set_thermostat_offset(&mut self, id: &str, offset: f64) -> Result<()> {
        self.ensure_authenticated().await?;

        let body = serde_json::to_value(OffsetUpdate::internal(offset))
            .map_err(|e| FritzError::ParseError(e.to_string()))?;
        self.authorized_request(Method::PUT, &unit_path(id), Some(&body))
            .await?;
        Ok(())
    }
}

fn unit_path(id: &str) -> String {
    format!("{}/{}", UNITS_PATH, id.replace('/', "%2F"))
}

/// Map a configuration unit onto the thermostat model.
///
/// Missing holiday/summer flags count as "off"; a missing connection flag
/// counts as "not connected".
fn unit_to_info(requested_id: &str, unit: Unit) -> Result<ThermostatInfo> {
    let adapted_temp = unit
        .interfaces
        .temperature_interface
        .as_ref()
        .and_then(|t| t.celsius)
        .ok_or_else(|| {
            FritzError::ParseError(format!("Unit {} reports no temperature", requested_id))
        })?;

    let thermostat = unit.interfaces.thermostat_interface.unwrap_or_default();
    let offset = thermostat
        .temperature_offset
        .as_ref()
        .and_then(|o| o.internal_offset)
        .ok_or_else(|| {
            FritzError::ParseError(format!("Unit {} reports no internal offset", requested_id))
        })?;

    let active = unit.is_connected.unwrap_or(false)
        && !thermostat.is_holiday_active.unwrap_or(false)
        && !thermostat.is_summertime_active.unwrap_or(false);

    Ok(ThermostatInfo::from_reported(
        unit.uid.unwrap_or_else(|| requested_id.to_string()),
        unit.name.unwrap_or_default(),
        active,
        adapted_temp,
        offset,
    ))
}

/// Best-effort diagnostic for a failed response: the body if there is one,
/// otherwise the status text
async fn extract_error(response: reqwest::Response) -> FritzError {
    let status = response.status();
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        _ => status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string(),
    };
    FritzError::server_error(status.as_u16(), message)
}

#[async_trait]
impl ThermostatGateway for FritzClient {
    async fn thermostat_info(&mut self, id: &str) -> ControlResult<ThermostatInfo> {
        FritzClient::thermostat_info(self, id)
            .await
            .map_err(ControlError::from)
    }

    async fn set_thermostat_offset(&mut self, id: &str, offset: f64) -> ControlResult<()> {
        FritzClient::set_thermostat_offset(self, id, offset)
            .await
            .map_err(ControlError::from)
    }
}
