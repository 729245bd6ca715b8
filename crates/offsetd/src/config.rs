//! Configuration handling for offsetd
//!
//! Values are layered, highest first: command-line flags and their
//! environment variables, the TOML config file, built-in defaults.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use offset_cloud::NetatmoCredentials;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Request timeout used when neither flag nor file set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug, Default)]
#[command(name = "offsetd")]
#[command(author, version, about = "Align FRITZ!Box thermostat offsets with the room temperature")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "OFFSETD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Request timeout for every HTTP call, in seconds
    #[arg(long, env = "OFFSETD_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Gateway host name or URL
    #[arg(long, env = "FRITZ_HOST")]
    pub fritz_host: Option<String>,

    /// Gateway user with smart-home rights
    #[arg(long, env = "FRITZ_USERNAME")]
    pub fritz_username: Option<String>,

    /// Password of the gateway user
    #[arg(long, env = "FRITZ_PASSWORD", hide_env_values = true)]
    pub fritz_password: Option<String>,

    /// Comma separated thermostat ids
    #[arg(long, env = "FRITZ_DEVICES")]
    pub fritz_devices: Option<String>,

    #[arg(long, env = "NETATMO_CLIENT_ID")]
    pub netatmo_client_id: Option<String>,

    #[arg(long, env = "NETATMO_CLIENT_SECRET", hide_env_values = true)]
    pub netatmo_client_secret: Option<String>,

    #[arg(long, env = "NETATMO_REFRESH_TOKEN", hide_env_values = true)]
    pub netatmo_refresh_token: Option<String>,

    /// Write key of the telemetry channel
    #[arg(long, env = "THING_SPEAK_API_KEY", hide_env_values = true)]
    pub thing_speak_api_key: Option<String>,
}

// =============================================================================
// Config file
// =============================================================================

/// Contents of the TOML config file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub fritz: FritzSection,
    pub netatmo: NetatmoSection,
    pub thingspeak: ThingSpeakSection,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FritzSection {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub devices: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetatmoSection {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThingSpeakSection {
    pub api_key: Option<String>,
}

impl FileConfig {
    /// Load the explicitly given file, or the default file if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Default config file path, if the platform has a config directory
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("offsetd").join("config.toml"))
    }
}

// =============================================================================
// Resolved config
// =============================================================================

/// Fully resolved configuration for one run
#[derive(Clone)]
pub struct Config {
    pub fritz_url: String,
    pub fritz_username: String,
    pub fritz_password: String,
    /// May be empty; the run reports that as a configuration error
    pub devices: Vec<String>,
    pub netatmo: NetatmoCredentials,
    pub thingspeak_api_key: String,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("fritz_url", &self.fritz_url)
            .field("fritz_username", &self.fritz_username)
            .field("devices", &self.devices)
            .field("netatmo", &self.netatmo)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Merge CLI arguments over config file values
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let host = required(cli.fritz_host.clone(), file.fritz.host, "FRITZ_HOST")?;

        let devices = match &cli.fritz_devices {
            Some(list) => parse_device_list(list),
            None => file
                .fritz
                .devices
                .unwrap_or_default()
                .iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
        };

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }

        Ok(Self {
            fritz_url: host_url(&host)?,
            fritz_username: required(
                cli.fritz_username.clone(),
                file.fritz.username,
                "FRITZ_USERNAME",
            )?,
            fritz_password: required(
                cli.fritz_password.clone(),
                file.fritz.password,
                "FRITZ_PASSWORD",
            )?,
            devices,
            netatmo: NetatmoCredentials {
                client_id: required(
                    cli.netatmo_client_id.clone(),
                    file.netatmo.client_id,
                    "NETATMO_CLIENT_ID",
                )?,
                client_secret: required(
                    cli.netatmo_client_secret.clone(),
                    file.netatmo.client_secret,
                    "NETATMO_CLIENT_SECRET",
                )?,
                refresh_token: required(
                    cli.netatmo_refresh_token.clone(),
                    file.netatmo.refresh_token,
                    "NETATMO_REFRESH_TOKEN",
                )?,
            },
            thingspeak_api_key: required(
                cli.thing_speak_api_key.clone(),
                file.thingspeak.api_key,
                "THING_SPEAK_API_KEY",
            )?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn required(flag: Option<String>, file: Option<String>, key: &str) -> Result<String> {
    flag.or(file)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("Missing configuration value: {}", key))
}

/// Split a comma separated device list, trimming entries and dropping empty ones
pub fn parse_device_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}

/// Base URL of the gateway; a bare host name is reached over plain HTTP
pub fn host_url(host: &str) -> Result<String> {
    let host = host.trim().trim_end_matches('/');
    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    let url = Url::parse(&candidate).with_context(|| format!("Invalid gateway host: {}", host))?;
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn full_cli() -> Cli {
        Cli {
            fritz_host: Some("fritz.box".to_string()),
            fritz_username: Some("smarthome".to_string()),
            fritz_password: Some("pw".to_string()),
            fritz_devices: Some("grouped-1, grouped-2".to_string()),
            netatmo_client_id: Some("id".to_string()),
            netatmo_client_secret: Some("secret".to_string()),
            netatmo_refresh_token: Some("refresh".to_string()),
            thing_speak_api_key: Some("KEY".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case("a,b", vec!["a", "b"])]
    #[case(" grouped-1 , grouped-2 ", vec!["grouped-1", "grouped-2"])]
    #[case("a,,b,", vec!["a", "b"])]
    #[case("", vec![])]
    #[case(" , ", vec![])]
    fn test_parse_device_list(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_device_list(input), expected);
    }

    #[rstest]
    #[case("fritz.box", "http://fritz.box/")]
    #[case("192.168.178.1", "http://192.168.178.1/")]
    #[case("https://fritz.box/", "https://fritz.box/")]
    #[case(" http://fritz.box:8080 ", "http://fritz.box:8080/")]
    fn test_host_url(#[case] host: &str, #[case] expected: &str) {
        assert_eq!(host_url(host).unwrap(), expected);
    }

    #[test]
    fn test_resolve_from_flags() {
        let config = Config::resolve(&full_cli(), FileConfig::default()).unwrap();
        assert_eq!(config.fritz_url, "http://fritz.box/");
        assert_eq!(config.devices, vec!["grouped-1", "grouped-2"]);
        assert_eq!(config.netatmo.refresh_token, "refresh");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_missing_value_is_named() {
        let cli = Cli {
            thing_speak_api_key: None,
            ..full_cli()
        };
        let err = Config::resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("THING_SPEAK_API_KEY"), "{err}");

        let cli = Cli {
            fritz_password: Some("  ".to_string()),
            ..full_cli()
        };
        let err = Config::resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("FRITZ_PASSWORD"), "{err}");
    }

    #[test]
    fn test_empty_device_list_is_not_a_config_error() {
        let cli = Cli {
            fritz_devices: Some(" , ".to_string()),
            ..full_cli()
        };
        let config = Config::resolve(&cli, FileConfig::default()).unwrap();
        assert!(config.devices.is_empty());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli = Cli {
            timeout_secs: Some(0),
            ..full_cli()
        };
        assert!(Config::resolve(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = Config::resolve(&full_cli(), FileConfig::default()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("\"pw\""));
        assert!(!debug.contains("KEY"));
        assert!(!debug.contains("refresh"));
    }
}
