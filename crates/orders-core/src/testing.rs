//! Shared test doubles for the core test suites.
//!
//! Collaborator services are stubbed at their trait seams and the store runs
//! on the in-memory backend, optionally wrapped to count writes so tests can
//! assert that idempotent paths do not touch the store.

use async_trait::async_trait;
use orders_catalog::{CatalogError, CatalogInterface, CatalogService};
use orders_config::Config;
use orders_payment::{PaymentError, PaymentInterface, PaymentService};
use orders_storage::implementations::memory::MemoryStorage;
use orders_storage::{OrderStore, StorageError, StorageInterface};
use orders_types::{Order, OrderItem, PaymentSession, Product, SessionRequest};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::OrderEngine;

/// Handle onto the number of writes a tracked store has performed.
pub(crate) struct WriteCounter(Arc<AtomicU64>);

impl WriteCounter {
	pub(crate) fn get(&self) -> u64 {
		self.0.load(Ordering::SeqCst)
	}
}

/// Memory backend that counts every write.
struct CountingStorage {
	inner: MemoryStorage,
	writes: Arc<AtomicU64>,
}

#[async_trait]
impl StorageInterface for CountingStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		self.inner.get_bytes(key).await
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		self.inner.set_bytes(key, value).await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		self.inner.delete(key).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		self.inner.exists(key).await
	}

	async fn list_bytes(&self, prefix: &str) -> Result<Vec<Vec<u8>>, StorageError> {
		self.inner.list_bytes(prefix).await
	}
}

/// An order store over a write-counting memory backend.
pub(crate) fn tracked_store() -> (Arc<OrderStore>, WriteCounter) {
	let writes = Arc::new(AtomicU64::new(0));
	let backend = CountingStorage {
		inner: MemoryStorage::new(),
		writes: Arc::clone(&writes),
	};
	(Arc::new(OrderStore::new(Box::new(backend))), WriteCounter(writes))
}

/// Inserts and returns a fresh PENDING order with one line item.
pub(crate) async fn pending_order(store: &OrderStore) -> Order {
	let order = Order::new(vec![OrderItem {
		product_id: Uuid::new_v4(),
		price: Decimal::from(10),
		quantity: 1,
	}]);
	store.insert(&order).await.unwrap();
	order
}

/// Builds a catalog product with a fresh id.
pub(crate) fn product(name: &str, price: u64) -> Product {
	Product {
		id: Uuid::new_v4(),
		name: name.to_string(),
		price: Decimal::from(price),
	}
}

/// Catalog stub answering from a fixed product list, or failing outright.
pub(crate) struct StubCatalog {
	pub products: Vec<Product>,
	pub fail: bool,
}

#[async_trait]
impl CatalogInterface for StubCatalog {
	async fn validate_products(
		&self,
		ids: &[Uuid],
		_require_available: bool,
	) -> Result<Vec<Product>, CatalogError> {
		if self.fail {
			return Err(CatalogError::Unavailable("stub catalog down".into()));
		}
		Ok(self
			.products
			.iter()
			.filter(|p| ids.contains(&p.id))
			.cloned()
			.collect())
	}
}

/// Payment stub returning a fixed session, or failing outright.
pub(crate) struct StubPayment {
	pub fail: bool,
}

#[async_trait]
impl PaymentInterface for StubPayment {
	async fn create_session(
		&self,
		_request: &SessionRequest,
	) -> Result<PaymentSession, PaymentError> {
		if self.fail {
			return Err(PaymentError::Unavailable("stub provider down".into()));
		}
		Ok(PaymentSession {
			cancel_url: "https://pay.test/cancel".into(),
			success_url: "https://pay.test/success".into(),
			url: "https://pay.test/session".into(),
		})
	}
}

/// Minimal configuration for engine tests.
pub(crate) fn test_config() -> Config {
	Config::from_toml_str(
		r#"
[service]
id = "orders-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[catalog]
primary = "http"
[catalog.implementations.http]
url = "http://localhost:3001/products/validate"

[payment]
primary = "http"
[payment.implementations.http]
url = "http://localhost:3003/payments/sessions"
"#,
	)
	.unwrap()
}

/// An engine over stubbed collaborators, plus the store it writes to.
pub(crate) fn engine(
	products: Vec<Product>,
	catalog_fails: bool,
	payment_fails: bool,
) -> (OrderEngine, Arc<OrderStore>) {
	let (store, _) = tracked_store();
	let catalog = Arc::new(CatalogService::new(Box::new(StubCatalog {
		products,
		fail: catalog_fails,
	})));
	let payment = Arc::new(PaymentService::new(
		Box::new(StubPayment { fail: payment_fails }),
		"usd".to_string(),
	));
	let engine = OrderEngine::new(test_config(), Arc::clone(&store), catalog, payment);
	(engine, store)
}
