//! Order store for the order lifecycle service.
//!
//! This crate provides the persistence abstraction for orders: a byte-level
//! `StorageInterface` implemented by interchangeable backends, and the typed
//! `OrderStore` facade exposing only the operations the core needs. An order
//! document embeds its line items and optional receipt, so creating an order
//! and confirming its payment are each a single atomic write.

use async_trait::async_trait;
use orders_types::{Order, OrderStatus};
use thiserror::Error;
use uuid::Uuid;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Key namespace under which order documents are stored.
const ORDERS_NAMESPACE: &str = "orders";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when creating an item that already exists.
	#[error("Already exists")]
	AlreadyExists,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// Backends provide key-value operations plus prefix listing for the
/// list-by-filter query. A `set_bytes` of a single key must be atomic:
/// concurrent readers observe either the previous or the new value, never a
/// partial write.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, creating or overwriting.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns the stored values of every key starting with `prefix`, in no
	/// particular order.
	async fn list_bytes(&self, prefix: &str) -> Result<Vec<Vec<u8>>, StorageError>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Typed order store over a pluggable storage backend.
///
/// This is the only persistence surface the orchestration and query
/// components see; the raw backend is never handed out.
pub struct OrderStore {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl OrderStore {
	/// Creates a new OrderStore with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(id: Uuid) -> String {
		format!("{}:{}", ORDERS_NAMESPACE, id)
	}

	fn encode(order: &Order) -> Result<Vec<u8>, StorageError> {
		serde_json::to_vec(order).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	fn decode(bytes: &[u8]) -> Result<Order, StorageError> {
		serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Persists a new order together with its line items in one write.
	///
	/// Fails with `AlreadyExists` if an order with the same id is present.
	pub async fn insert(&self, order: &Order) -> Result<(), StorageError> {
		let key = Self::key(order.id);
		if self.backend.exists(&key).await? {
			return Err(StorageError::AlreadyExists);
		}
		self.backend.set_bytes(&key, Self::encode(order)?).await
	}

	/// Retrieves an order by id, with its items.
	pub async fn get(&self, id: Uuid) -> Result<Order, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(id)).await?;
		Self::decode(&bytes)
	}

	/// Replaces an existing order document in one atomic write.
	///
	/// Fails with `NotFound` if the order was never created; updates never
	/// bring orders into existence.
	pub async fn update(&self, order: &Order) -> Result<(), StorageError> {
		let key = Self::key(order.id);
		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}
		self.backend.set_bytes(&key, Self::encode(order)?).await
	}

	/// Lists orders matching the optional status filter, ordered by creation
	/// time (ties broken by id) so that pagination is stable.
	pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StorageError> {
		let prefix = format!("{}:", ORDERS_NAMESPACE);
		let mut orders = Vec::new();
		for bytes in self.backend.list_bytes(&prefix).await? {
			let order = Self::decode(&bytes)?;
			if status.is_none_or(|s| order.status == s) {
				orders.push(order);
			}
		}
		orders.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
		Ok(orders)
	}

	/// Counts orders matching the optional status filter.
	pub async fn count(&self, status: Option<OrderStatus>) -> Result<u64, StorageError> {
		Ok(self.list(status).await?.len() as u64)
	}
}
