//! Engine construction from configuration and implementation factories.
//!
//! The service binary registers one factory per implementation name; the
//! builder resolves each component's configured `primary` against those maps
//! and wires the resulting services into an `OrderEngine`. The store handle
//! is created here and injected explicitly; nothing holds process-wide
//! persistence state.

use crate::OrderEngine;
use orders_catalog::{CatalogFactory, CatalogService};
use orders_config::Config;
use orders_payment::{PaymentFactory, PaymentService};
use orders_storage::{OrderStore, StorageFactory};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building the engine.
#[derive(Debug, Error)]
pub enum BuildError {
	/// The configured implementation name has no registered factory.
	#[error("Unknown {kind} implementation: {name}")]
	UnknownImplementation { kind: &'static str, name: String },
	/// The configured implementation name has no configuration table.
	#[error("Missing configuration for {kind} implementation: {name}")]
	MissingConfiguration { kind: &'static str, name: String },
	/// A factory rejected its configuration.
	#[error("Failed to initialize {kind}: {message}")]
	Initialization { kind: &'static str, message: String },
}

/// Factories for all pluggable implementations, keyed by name.
pub struct EngineFactories {
	pub storage_factories: HashMap<String, StorageFactory>,
	pub catalog_factories: HashMap<String, CatalogFactory>,
	pub payment_factories: HashMap<String, PaymentFactory>,
}

/// Builder assembling an `OrderEngine` from configuration.
pub struct OrderEngineBuilder {
	config: Config,
}

impl OrderEngineBuilder {
	/// Creates a builder for the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Resolves the configured implementations and builds the engine.
	pub fn build(self, factories: EngineFactories) -> Result<OrderEngine, BuildError> {
		let backend = instantiate(
			"storage",
			&self.config.storage.primary,
			&self.config.storage.implementations,
			&factories.storage_factories,
		)?;
		let catalog = instantiate(
			"catalog",
			&self.config.catalog.primary,
			&self.config.catalog.implementations,
			&factories.catalog_factories,
		)?;
		let payment = instantiate(
			"payment",
			&self.config.payment.primary,
			&self.config.payment.implementations,
			&factories.payment_factories,
		)?;

		let store = Arc::new(OrderStore::new(backend));
		let catalog = Arc::new(CatalogService::new(catalog));
		let payment = Arc::new(PaymentService::new(
			payment,
			self.config.payment.currency.clone(),
		));

		Ok(OrderEngine::new(self.config, store, catalog, payment))
	}
}

/// Looks up the factory and configuration for `primary` and runs the factory.
fn instantiate<T: ?Sized, E: std::fmt::Display>(
	kind: &'static str,
	primary: &str,
	configs: &HashMap<String, toml::Value>,
	factories: &HashMap<String, fn(&toml::Value) -> Result<Box<T>, E>>,
) -> Result<Box<T>, BuildError> {
	let factory = factories
		.get(primary)
		.ok_or_else(|| BuildError::UnknownImplementation {
			kind,
			name: primary.to_string(),
		})?;
	let config = configs
		.get(primary)
		.ok_or_else(|| BuildError::MissingConfiguration {
			kind,
			name: primary.to_string(),
		})?;
	factory(config).map_err(|e| BuildError::Initialization {
		kind,
		message: e.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::test_config;
	use orders_catalog::implementations::http::create_catalog;
	use orders_payment::implementations::http::create_payment;
	use orders_storage::implementations::memory::create_storage;

	fn factories() -> EngineFactories {
		let mut storage_factories: HashMap<String, StorageFactory> = HashMap::new();
		storage_factories.insert("memory".to_string(), create_storage);

		let mut catalog_factories: HashMap<String, CatalogFactory> = HashMap::new();
		catalog_factories.insert("http".to_string(), create_catalog);

		let mut payment_factories: HashMap<String, PaymentFactory> = HashMap::new();
		payment_factories.insert("http".to_string(), create_payment);

		EngineFactories {
			storage_factories,
			catalog_factories,
			payment_factories,
		}
	}

	#[test]
	fn builds_engine_from_minimal_config() {
		let engine = OrderEngineBuilder::new(test_config())
			.build(factories())
			.unwrap();

		assert_eq!(engine.config().service.id, "orders-test");
	}

	#[test]
	fn rejects_unregistered_primary_implementation() {
		let mut config = test_config();
		config.storage.primary = "redis".to_string();
		config
			.storage
			.implementations
			.insert("redis".to_string(), toml::Value::Table(toml::map::Map::new()));

		let result = OrderEngineBuilder::new(config).build(factories());
		assert!(matches!(
			result,
			Err(BuildError::UnknownImplementation { kind: "storage", .. })
		));
	}

	#[test]
	fn surfaces_factory_configuration_failures() {
		let mut config = test_config();
		// Drop the catalog url so its factory rejects the configuration.
		config
			.catalog
			.implementations
			.insert("http".to_string(), toml::Value::Table(toml::map::Map::new()));

		let result = OrderEngineBuilder::new(config).build(factories());
		assert!(matches!(
			result,
			Err(BuildError::Initialization { kind: "catalog", .. })
		));
	}
}
