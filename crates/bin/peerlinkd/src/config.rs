//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `peerlink.toml` in the working directory, or at the path given
//! by `PEERLINK_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::collections::BTreeMap;

use serde::Deserialize;

use peerlink_adapter_virtual::DEFAULT_LOG_CAPACITY;
use peerlink_domain::device::DeviceName;
use peerlink_domain::error::PeerLinkError;
use peerlink_domain::rule::RuleDefinition;
use peerlink_domain::state::State;

const DEFAULT_PATH: &str = "peerlink.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Change bus settings.
    pub bus: BusConfig,
    /// Devices and groups known to the virtual host at startup.
    pub registry: RegistryConfig,
    /// Rule definitions, in dispatch order.
    pub rules: Vec<RuleDefinition>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
    /// Rule log lines kept for the `logs` command; older ones are dropped.
    pub history: usize,
}

/// Change bus configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Number of changes buffered per subscriber before it lags.
    pub capacity: usize,
}

/// Initial registry content: name → state.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub devices: BTreeMap<DeviceName, State>,
    pub groups: BTreeMap<DeviceName, State>,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PEERLINK_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PEERLINK_BUS_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                self.bus.capacity = capacity;
            }
        }
        if let Ok(val) = std::env::var("PEERLINK_LOG_HISTORY") {
            if let Ok(history) = val.parse() {
                self.logging.history = history;
            }
        }
        if let Ok(val) = std::env::var("PEERLINK_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.capacity == 0 {
            return Err(ConfigError::Validation(
                "bus capacity must be non-zero".to_string(),
            ));
        }
        if let Some(name) = self
            .registry
            .devices
            .keys()
            .find(|name| self.registry.groups.contains_key(*name))
        {
            return Err(ConfigError::Validation(format!(
                "{name} is declared both as a device and as a group"
            )));
        }
        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate()
                .map_err(|source| ConfigError::Rule { index, source })?;
        }
        Ok(())
    }

    /// Names referenced by rules that the registry does not declare.
    ///
    /// These resolve to nothing at runtime and show up as ERROR log lines.
    #[must_use]
    pub fn unknown_references(&self) -> Vec<(String, DeviceName)> {
        let known = |name: &DeviceName| {
            self.registry.devices.contains_key(name) || self.registry.groups.contains_key(name)
        };
        let mut unknown = Vec::new();
        for rule in &self.rules {
            for name in referenced(rule) {
                if !known(name) {
                    unknown.push((rule.to_string(), name.clone()));
                }
            }
        }
        unknown
    }
}

fn referenced(rule: &RuleDefinition) -> Vec<&DeviceName> {
    match rule {
        RuleDefinition::Synonym { devices, .. } | RuleDefinition::Exclusive { devices, .. } => {
            devices.iter().collect()
        }
        RuleDefinition::SynonymWithGroups {
            devices, groups, ..
        } => devices.iter().chain(groups).collect(),
        RuleDefinition::TimedAutoOff { devices, .. } => devices.keys().collect(),
        RuleDefinition::MainDrivesAll { main, devices, .. }
        | RuleDefinition::Cascade { main, devices }
        | RuleDefinition::MutualGroup { main, devices } => {
            std::iter::once(main).chain(devices).collect()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "peerlinkd=info,peerlink_app=info,peerlink_adapter_virtual=info".to_string(),
            history: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A rule definition violates a domain invariant.
    #[error("invalid rule #{index}")]
    Rule {
        index: usize,
        #[source]
        source: PeerLinkError,
    },
}
