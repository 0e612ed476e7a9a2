//! HTTP implementation of the catalog interface.
//!
//! Speaks the catalog service's validation endpoint: a POST carrying the
//! requested ids and the availability flag, answered with the resolved
//! product records.

use crate::{CatalogError, CatalogInterface};
use async_trait::async_trait;
use orders_types::Product;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Wire request for the catalog validation endpoint.
#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
	ids: &'a [Uuid],
	available: bool,
}

/// HTTP client for the product catalog service.
pub struct HttpCatalog {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpCatalog {
	/// Creates a new HttpCatalog for the given endpoint with a per-request
	/// timeout.
	pub fn new(endpoint: String, timeout: Duration) -> Result<Self, CatalogError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| CatalogError::Configuration(e.to_string()))?;

		Ok(Self { client, endpoint })
	}
}

#[async_trait]
impl CatalogInterface for HttpCatalog {
	async fn validate_products(
		&self,
		ids: &[Uuid],
		require_available: bool,
	) -> Result<Vec<Product>, CatalogError> {
		let request = ValidateRequest {
			ids,
			available: require_available,
		};

		tracing::debug!(
			ids = ids.len(),
			require_available,
			"Validating products against the catalog"
		);

		let response = self
			.client
			.post(&self.endpoint)
			.json(&request)
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					CatalogError::Timeout
				} else {
					CatalogError::Unavailable(e.to_string())
				}
			})?;

		let status = response.status();
		if !status.is_success() {
			return Err(CatalogError::Unavailable(format!(
				"catalog returned {}",
				status
			)));
		}

		response
			.json::<Vec<Product>>()
			.await
			.map_err(|e| CatalogError::InvalidResponse(e.to_string()))
	}
}

/// Factory function to create a catalog client from configuration.
///
/// Configuration parameters:
/// - `url`: validation endpoint of the catalog service (required)
/// - `timeout_seconds`: per-request timeout (default: 5)
pub fn create_catalog(
	config: &toml::Value,
) -> Result<Box<dyn CatalogInterface>, CatalogError> {
	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| CatalogError::Configuration("catalog url is required".into()))?
		.to_string();

	let timeout_seconds = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	Ok(Box::new(HttpCatalog::new(
		url,
		Duration::from_secs(timeout_seconds),
	)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn factory_requires_url() {
		let config: toml::Value = toml::from_str("timeout_seconds = 2").unwrap();
		assert!(matches!(
			create_catalog(&config),
			Err(CatalogError::Configuration(_))
		));
	}

	#[test]
	fn factory_accepts_url_with_default_timeout() {
		let config: toml::Value =
			toml::from_str("url = \"http://localhost:3001/products/validate\"").unwrap();
		assert!(create_catalog(&config).is_ok());
	}
}
