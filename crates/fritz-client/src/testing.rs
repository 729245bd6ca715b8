//! Test utilities for fritz-client
//!
//! [`TestServer`] runs any axum router on an ephemeral port; [`MockGateway`]
//! is an in-process fake of the gateway's login and smart-home endpoints that
//! verifies login responses with the real key derivation.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use tokio::net::TcpListener;

use crate::auth::Challenge;
use crate::session::ZERO_SID;
use crate::types::{
    OffsetUpdate, TemperatureInterface, TemperatureOffset, ThermostatInterface, Unit,
    UnitInterfaces,
};
use crate::Result;

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Serve `router` on 127.0.0.1 with an OS-assigned port
    pub async fn start(router: Router) -> Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal if not already done
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Abort the task if still running
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// =============================================================================
// Mock gateway
// =============================================================================

/// Cheap challenge so tests do not spend time in PBKDF2
pub const TEST_CHALLENGE: &str = "2$100$a1b2c3d4$50$e5f6a7b8";

/// Session id handed out by the mock after a good login
pub const TEST_SID: &str = "5e551011d0000001";

/// Request counters recorded by [`MockGateway`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayStats {
    pub challenge_requests: usize,
    pub login_requests: usize,
    pub unit_reads: usize,
    /// `(unit id, offset)` for every accepted PUT, in order
    pub offset_writes: Vec<(String, f64)>,
    /// Authorized requests refused for a missing or stale session id
    pub rejected_requests: usize,
}

struct GatewayState {
    username: String,
    password: String,
    challenge: String,
    block_time: u64,
    sid: String,
    units: HashMap<String, Unit>,
    stats: GatewayStats,
}

/// In-process fake of the gateway.
///
/// Cloning shares state, so a test keeps one handle for assertions while the
/// router serves requests.
#[derive(Clone)]
pub struct MockGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl MockGateway {
    /// Gateway accepting exactly `username` / `password`
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(GatewayState {
                username: username.to_string(),
                password: password.to_string(),
                challenge: TEST_CHALLENGE.to_string(),
                block_time: 0,
                sid: TEST_SID.to_string(),
                units: HashMap::new(),
                stats: GatewayStats::default(),
            })),
        }
    }

    /// Replace the challenge string handed out
    pub fn with_challenge(self, challenge: &str) -> Self {
        self.state.lock().challenge = challenge.to_string();
        self
    }

    /// Report a login block time with every challenge
    pub fn with_block_time(self, seconds: u64) -> Self {
        self.state.lock().block_time = seconds;
        self
    }

    /// Register a raw configuration unit
    pub fn with_unit(self, id: &str, unit: Unit) -> Self {
        self.state.lock().units.insert(id.to_string(), unit);
        self
    }

    /// Register a connected thermostat in normal mode.
    ///
    /// `celsius` is the reported (adapted) temperature with `offset` applied.
    pub fn with_thermostat(self, id: &str, name: &str, celsius: f64, offset: f64) -> Self {
        let unit = thermostat_unit(id, name, Some(true), celsius, offset);
        self.with_unit(id, unit)
    }

    /// Invalidate the current session id, as the gateway does after a timeout
    pub fn expire_session(&self) {
        self.state.lock().sid = "5e551011d0000002".to_string();
    }

    /// Snapshot of the request counters
    pub fn stats(&self) -> GatewayStats {
        self.state.lock().stats.clone()
    }

    /// Current state of a registered unit
    pub fn unit(&self, id: &str) -> Option<Unit> {
        self.state.lock().units.get(id).cloned()
    }

    /// Router serving the login and smart-home endpoints
    pub fn router(&self) -> Router {
        Router::new()
            .route("/login_sid.lua", get(login_sid))
            .route(
                "/api/v0/smarthome/configuration/units/{id}",
                get(get_unit).put(put_unit),
            )
            .with_state(self.clone())
    }

    fn authorize(&self, headers: &HeaderMap) -> std::result::Result<(), Response> {
        let mut state = self.state.lock();
        let expected = format!("AVM-SID {}", state.sid);
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if provided == Some(expected.as_str()) {
            Ok(())
        } else {
            state.stats.rejected_requests += 1;
            Err((StatusCode::FORBIDDEN, "Session invalid").into_response())
        }
    }
}

/// Build a thermostat unit as the gateway reports it
pub fn thermostat_unit(
    id: &str,
    name: &str,
    connected: Option<bool>,
    celsius: f64,
    offset: f64,
) -> Unit {
    Unit {
        uid: Some(id.to_string()),
        name: Some(name.to_string()),
        is_connected: connected,
        interfaces: UnitInterfaces {
            temperature_interface: Some(TemperatureInterface {
                celsius: Some(celsius),
            }),
            thermostat_interface: Some(ThermostatInterface {
                is_holiday_active: Some(false),
                is_summertime_active: Some(false),
                temperature_offset: Some(TemperatureOffset {
                    sensor_mode: Some("internal".to_string()),
                    internal_offset: Some(offset),
                }),
            }),
        },
    }
}

fn session_info(sid: &str, challenge: &str, block_time: u64) -> Response {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?><SessionInfo><SID>{}</SID>\
         <Challenge>{}</Challenge><BlockTime>{}</BlockTime><Rights></Rights></SessionInfo>",
        sid, challenge, block_time
    );
    ([(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

async fn login_sid(
    State(gateway): State<MockGateway>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = gateway.state.lock();

    let Some(response) = params.get("response") else {
        state.stats.challenge_requests += 1;
        return session_info(ZERO_SID, &state.challenge, state.block_time);
    };

    state.stats.login_requests += 1;
    let expected = state
        .challenge
        .parse::<Challenge>()
        .ok()
        .map(|c| c.response(&state.password));
    let user_ok = params.get("username") == Some(&state.username);

    if user_ok && expected.as_deref() == Some(response.as_str()) {
        session_info(&state.sid, &state.challenge, 0)
    } else {
        session_info(ZERO_SID, &state.challenge, state.block_time)
    }
}

async fn get_unit(
    State(gateway): State<MockGateway>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = gateway.authorize(&headers) {
        return rejection;
    }

    let mut state = gateway.state.lock();
    state.stats.unit_reads += 1;
    match state.units.get(&id) {
        Some(unit) => Json(unit.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_unit(
    State(gateway): State<MockGateway>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<OffsetUpdate>,
) -> Response {
    if let Err(rejection) = gateway.authorize(&headers) {
        return rejection;
    }

    let mut state = gateway.state.lock();
    let Some(offset) = update.offset() else {
        return (StatusCode::BAD_REQUEST, "internalOffset missing").into_response();
    };
    let Some(unit) = state.units.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    // The device keeps its raw sensor reading and re-applies the new offset
    let thermostat = unit
        .interfaces
        .thermostat_interface
        .get_or_insert_with(ThermostatInterface::default);
    let previous = thermostat
        .temperature_offset
        .as_ref()
        .and_then(|o| o.internal_offset)
        .unwrap_or(0.0);
    thermostat.temperature_offset = Some(update.interfaces.thermostat_interface.temperature_offset);
    if let Some(celsius) = unit
        .interfaces
        .temperature_interface
        .as_mut()
        .and_then(|t| t.celsius.as_mut())
    {
        *celsius += offset - previous;
    }

    state.stats.offset_writes.push((id, offset));
    StatusCode::OK.into_response()
}
