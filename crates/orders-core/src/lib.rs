//! Core orchestration for the order lifecycle service.
//!
//! This crate composes the order store, the product catalog client and the
//! payment provider client into the service's inbound operations: order
//! creation, status changes, payment-confirmation reconciliation and the
//! read side. The `OrderEngine` is the composition root handed to the
//! transport layer; it owns the collaborating services and nothing else
//! touches them directly.

use orders_config::Config;
use orders_types::{
	ApiError, CreateOrderRequest, CreateOrderResponse, Order, OrderPage, OrderResponse,
	OrderStatus, PaymentSucceeded,
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub mod builder;
pub mod orchestrator;
pub mod query;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{BuildError, EngineFactories, OrderEngineBuilder};

use orchestrator::OrderOrchestrator;
use orders_catalog::CatalogService;
use orders_payment::PaymentService;
use orders_storage::OrderStore;
use query::OrderQueryService;
use state::OrderStateMachine;

/// Errors produced by the order operations.
#[derive(Debug, Error)]
pub enum OrderError {
	/// One or more requested products are unknown or unavailable, or the
	/// catalog call itself failed. Nothing was persisted.
	#[error("Product validation failed: {0}")]
	ProductValidation(String),
	/// The payment session could not be acquired. The order is persisted in
	/// PENDING; the caller retries session acquisition, not order creation.
	#[error("Payment session failed: {0}")]
	PaymentSession(String),
	/// The order store rejected the operation or is unreachable.
	#[error("Persistence failure: {0}")]
	Persistence(String),
	/// The referenced order does not exist.
	#[error("Order with id {0} not found")]
	NotFound(Uuid),
	/// A collaborator call failed outside a context with a more specific
	/// meaning (e.g. read-side enrichment).
	#[error("Downstream failure: {0}")]
	Downstream(String),
}

impl From<OrderError> for ApiError {
	fn from(err: OrderError) -> Self {
		let message = err.to_string();
		match err {
			OrderError::ProductValidation(_) => ApiError::BadRequest(message),
			OrderError::NotFound(_) => ApiError::NotFound(message),
			OrderError::PaymentSession(_) | OrderError::Downstream(_) => {
				ApiError::ServiceUnavailable(message)
			}
			OrderError::Persistence(_) => ApiError::Internal(message),
		}
	}
}

/// Engine exposing the order operations to the transport layer.
///
/// Each inbound request or event is handled as an independent unit of work;
/// there is no per-order lock. Correctness under concurrent operations on
/// the same order relies on the store's atomic single-document writes and on
/// the idempotency of the transitions.
pub struct OrderEngine {
	/// Service configuration.
	config: Config,
	/// Creation flow and payment reconciliation.
	orchestrator: OrderOrchestrator,
	/// Read-side lookups.
	queries: OrderQueryService,
	/// Status transition guard.
	state_machine: Arc<OrderStateMachine>,
}

impl OrderEngine {
	/// Creates an engine from its collaborating services.
	pub fn new(
		config: Config,
		store: Arc<OrderStore>,
		catalog: Arc<CatalogService>,
		payment: Arc<PaymentService>,
	) -> Self {
		let state_machine = Arc::new(OrderStateMachine::new(Arc::clone(&store)));
		let orchestrator = OrderOrchestrator::new(
			Arc::clone(&store),
			Arc::clone(&catalog),
			payment,
			Arc::clone(&state_machine),
		);
		let queries = OrderQueryService::new(store, catalog);

		Self {
			config,
			orchestrator,
			queries,
			state_machine,
		}
	}

	/// Creates an order and opens its payment session.
	pub async fn create_order(
		&self,
		request: CreateOrderRequest,
	) -> Result<CreateOrderResponse, OrderError> {
		self.orchestrator.create_order(request).await
	}

	/// Returns one page of orders matching the optional status filter.
	pub async fn find_all(
		&self,
		page: u32,
		limit: u32,
		status: Option<OrderStatus>,
	) -> Result<OrderPage, OrderError> {
		self.queries.find_all(page, limit, status).await
	}

	/// Returns a single order with its line items enriched by catalog names.
	pub async fn find_one(&self, id: Uuid) -> Result<OrderResponse, OrderError> {
		self.queries.find_one(id).await
	}

	/// Applies an explicit status change to an order.
	pub async fn change_status(
		&self,
		id: Uuid,
		status: OrderStatus,
	) -> Result<Order, OrderError> {
		self.state_machine.change_status(id, status).await
	}

	/// Applies a payment confirmation event to its order.
	pub async fn handle_payment_succeeded(
		&self,
		event: PaymentSucceeded,
	) -> Result<Order, OrderError> {
		self.orchestrator.handle_payment_succeeded(&event).await
	}

	/// Returns the engine's configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}
}
