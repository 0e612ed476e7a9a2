//! Main entry point for the orders service.
//!
//! This binary wires the configured storage backend and collaborator clients
//! into the order engine and serves the inbound operations over HTTP. All
//! pluggable components are selected by name from the configuration and
//! instantiated through factory maps registered here.

use clap::Parser;
use orders_config::Config;
use orders_core::{BuildError, EngineFactories, OrderEngine, OrderEngineBuilder};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

// Import implementations from individual crates
use orders_catalog::implementations::http::create_catalog;
use orders_catalog::CatalogFactory;
use orders_payment::implementations::http::create_payment;
use orders_payment::PaymentFactory;
use orders_storage::implementations::file::create_storage as create_file_storage;
use orders_storage::implementations::memory::create_storage as create_memory_storage;
use orders_storage::StorageFactory;

/// Command-line arguments for the orders service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the orders service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the order engine with all implementations
/// 5. Serves the inbound operations until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started orders service");

	// Load configuration
	let config = Config::from_file(&args.config)?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	// Build the engine with implementations
	let engine = Arc::new(build_engine(config)?);

	server::start_server(engine).await?;

	tracing::info!("Stopped orders service");
	Ok(())
}

/// Builds the order engine with all registered implementations.
///
/// This function wires up the concrete implementations for:
/// - Storage backends (in-memory, file)
/// - The product catalog client (HTTP)
/// - The payment provider client (HTTP)
fn build_engine(config: Config) -> Result<OrderEngine, BuildError> {
	let mut storage_factories: HashMap<String, StorageFactory> = HashMap::new();
	storage_factories.insert("file".to_string(), create_file_storage);
	storage_factories.insert("memory".to_string(), create_memory_storage);

	let mut catalog_factories: HashMap<String, CatalogFactory> = HashMap::new();
	catalog_factories.insert("http".to_string(), create_catalog);

	let mut payment_factories: HashMap<String, PaymentFactory> = HashMap::new();
	payment_factories.insert("http".to_string(), create_payment);

	OrderEngineBuilder::new(config).build(EngineFactories {
		storage_factories,
		catalog_factories,
		payment_factories,
	})
}
