//! Configuration module for the order lifecycle service.
//!
//! Configuration is loaded from a TOML file and validated before the service
//! is built. Each pluggable component (storage backend, catalog client,
//! payment client) selects a `primary` implementation by name and carries the
//! per-implementation settings as raw TOML tables, which the implementation
//! factories parse themselves.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this service instance.
	pub service: ServiceConfig,
	/// Configuration for the order store backend.
	pub storage: StorageConfig,
	/// Configuration for the product catalog client.
	pub catalog: CatalogConfig,
	/// Configuration for the payment provider client.
	pub payment: PaymentConfig,
	/// Configuration for the inbound HTTP server.
	#[serde(default)]
	pub api: ApiConfig,
}

/// Identity settings for the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this instance, used in logs.
	pub id: String,
}

/// Configuration for the order store backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the product catalog client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of catalog implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the payment provider client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// ISO currency code used for payment sessions.
	#[serde(default = "default_currency")]
	pub currency: String,
	/// Map of payment implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

fn default_currency() -> String {
	"usd".to_string()
}

/// Configuration for the inbound HTTP server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Address to bind to.
	#[serde(default = "default_host")]
	pub host: String,
	/// Port to listen on.
	#[serde(default = "default_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
		}
	}
}

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_port() -> u16 {
	3002
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_toml_str(&contents)
	}

	/// Parses and validates configuration from a TOML string.
	pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(contents)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates cross-field constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation("service.id must not be empty".into()));
		}
		Self::check_primary("storage", &self.storage.primary, &self.storage.implementations)?;
		Self::check_primary("catalog", &self.catalog.primary, &self.catalog.implementations)?;
		Self::check_primary("payment", &self.payment.primary, &self.payment.implementations)?;
		Ok(())
	}

	fn check_primary(
		section: &str,
		primary: &str,
		implementations: &HashMap<String, toml::Value>,
	) -> Result<(), ConfigError> {
		if !implementations.contains_key(primary) {
			return Err(ConfigError::Validation(format!(
				"{}.primary \"{}\" has no matching [{}.implementations.{}] table",
				section, primary, section, primary
			)));
		}
		Ok(())
	}
}
