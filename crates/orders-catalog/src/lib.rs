//! Product validator client for the order lifecycle service.
//!
//! This crate talks to the external product catalog. Given a set of product
//! ids it returns the authoritative name and price for each id the catalog
//! knows; ids the catalog cannot resolve are simply absent from the result,
//! which callers must detect themselves. Only transport-level problems are
//! errors.

use async_trait::async_trait;
use orders_types::Product;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

/// Errors that can occur while validating products.
#[derive(Debug, Error)]
pub enum CatalogError {
	/// Error that occurs when the catalog service cannot be reached.
	#[error("Catalog unavailable: {0}")]
	Unavailable(String),
	/// Error that occurs when the catalog call exceeds its timeout.
	#[error("Catalog timed out")]
	Timeout,
	/// Error that occurs when the catalog returns an unparseable payload.
	#[error("Invalid catalog response: {0}")]
	InvalidResponse(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface to the product catalog.
///
/// When `require_available` is set, the catalog only returns products that
/// are currently in stock; creation flows use this so that out-of-stock
/// items are not orderable. Read-enrichment flows pass `false` so a
/// discontinued product still renders in order history.
#[async_trait]
pub trait CatalogInterface: Send + Sync {
	/// Validates the given product ids against the catalog.
	///
	/// The returned list contains one record per id the catalog resolved;
	/// unknown ids are omitted rather than reported as an error.
	async fn validate_products(
		&self,
		ids: &[Uuid],
		require_available: bool,
	) -> Result<Vec<Product>, CatalogError>;
}

/// Type alias for catalog factory functions.
pub type CatalogFactory = fn(&toml::Value) -> Result<Box<dyn CatalogInterface>, CatalogError>;

/// Service wrapping the configured catalog implementation.
pub struct CatalogService {
	/// The underlying catalog implementation.
	implementation: Box<dyn CatalogInterface>,
}

impl CatalogService {
	/// Creates a new CatalogService with the specified implementation.
	pub fn new(implementation: Box<dyn CatalogInterface>) -> Self {
		Self { implementation }
	}

	/// Validates product ids and returns the resolved products keyed by id.
	///
	/// Keying by id serves the callers' missing-id checks: an id absent from
	/// the map was not resolved by the catalog.
	pub async fn validate_products(
		&self,
		ids: &[Uuid],
		require_available: bool,
	) -> Result<HashMap<Uuid, Product>, CatalogError> {
		let products = self
			.implementation
			.validate_products(ids, require_available)
			.await?;
		Ok(products.into_iter().map(|p| (p.id, p)).collect())
	}
}
