//! Order orchestration.
//!
//! Composes the catalog, the store and the payment provider into the order
//! creation flow, and applies payment-confirmation events to persisted
//! orders. The creation sequence is strictly validate → persist → initiate
//! payment: each step depends on the committed outcome of the previous one.

use crate::state::OrderStateMachine;
use crate::OrderError;
use orders_catalog::CatalogService;
use orders_payment::PaymentService;
use orders_storage::OrderStore;
use orders_types::{
	CreateOrderRequest, CreateOrderResponse, Order, OrderItem, PaymentSucceeded, Product,
	SessionLineItem,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Orchestrates order creation and payment reconciliation.
pub struct OrderOrchestrator {
	store: Arc<OrderStore>,
	catalog: Arc<CatalogService>,
	payment: Arc<PaymentService>,
	state_machine: Arc<OrderStateMachine>,
}

impl OrderOrchestrator {
	pub fn new(
		store: Arc<OrderStore>,
		catalog: Arc<CatalogService>,
		payment: Arc<PaymentService>,
		state_machine: Arc<OrderStateMachine>,
	) -> Self {
		Self {
			store,
			catalog,
			payment,
			state_machine,
		}
	}

	/// Creates an order from the requested items and opens its payment
	/// session.
	///
	/// Prices are snapshotted from the catalog's answer and the totals are
	/// derived from them once; the order plus its line items are persisted in
	/// a single atomic write. A failed payment-session call leaves the order
	/// in PENDING: the order id is the durable handle against which the
	/// caller retries session acquisition.
	pub async fn create_order(
		&self,
		request: CreateOrderRequest,
	) -> Result<CreateOrderResponse, OrderError> {
		let product_ids = distinct_product_ids(&request);

		let products = self
			.catalog
			.validate_products(&product_ids, true)
			.await
			.map_err(|e| OrderError::ProductValidation(e.to_string()))?;

		let missing: Vec<String> = product_ids
			.iter()
			.filter(|id| !products.contains_key(id))
			.map(|id| id.to_string())
			.collect();
		if !missing.is_empty() {
			return Err(OrderError::ProductValidation(format!(
				"products not found in catalog: {}",
				missing.join(", ")
			)));
		}

		let mut line_items = Vec::with_capacity(request.items.len());
		let mut session_items = Vec::with_capacity(request.items.len());
		for requested in &request.items {
			let product = products.get(&requested.product_id).ok_or_else(|| {
				OrderError::ProductValidation(format!(
					"product {} missing from catalog response",
					requested.product_id
				))
			})?;
			line_items.push(OrderItem {
				product_id: requested.product_id,
				price: product.price,
				quantity: requested.quantity,
			});
			session_items.push(SessionLineItem {
				name: product.name.clone(),
				price: product.price,
				quantity: requested.quantity,
			});
		}

		let order = Order::new(line_items);
		self.store
			.insert(&order)
			.await
			.map_err(|e| OrderError::Persistence(e.to_string()))?;

		tracing::info!(
			order_id = %order.id,
			total_amount = %order.total_amount,
			total_items = order.total_items,
			"Created order"
		);

		let payment_session = self
			.payment
			.create_session(order.id, session_items)
			.await
			.map_err(|e| {
				tracing::warn!(
					order_id = %order.id,
					"Payment session failed, order remains PENDING: {}",
					e
				);
				OrderError::PaymentSession(e.to_string())
			})?;

		let names = product_names(&products);
		Ok(CreateOrderResponse {
			order: order.into_response(&names),
			payment_session,
		})
	}

	/// Applies a payment confirmation to its order.
	///
	/// Invoked from the fire-and-forget event path; redelivery is harmless
	/// because the underlying transition is idempotent.
	pub async fn handle_payment_succeeded(
		&self,
		event: &PaymentSucceeded,
	) -> Result<Order, OrderError> {
		tracing::info!(
			order_id = %event.order_id,
			charge_id = %event.stripe_payment_id,
			"Payment confirmation received"
		);
		self.state_machine
			.mark_paid(event.order_id, &event.stripe_payment_id, &event.receipt_url)
			.await
	}
}

/// Requested product ids with duplicates removed, in first-seen order.
fn distinct_product_ids(request: &CreateOrderRequest) -> Vec<Uuid> {
	let mut ids = Vec::with_capacity(request.items.len());
	for item in &request.items {
		if !ids.contains(&item.product_id) {
			ids.push(item.product_id);
		}
	}
	ids
}

fn product_names(products: &HashMap<Uuid, Product>) -> HashMap<Uuid, String> {
	products
		.iter()
		.map(|(id, product)| (*id, product.name.clone()))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{engine, product};
	use crate::OrderError;
	use orders_types::{OrderItemRequest, OrderStatus};
	use rust_decimal::Decimal;

	fn request_for(items: &[(Uuid, u32)]) -> CreateOrderRequest {
		CreateOrderRequest {
			items: items
				.iter()
				.map(|(product_id, quantity)| OrderItemRequest {
					product_id: *product_id,
					quantity: *quantity,
				})
				.collect(),
		}
	}

	#[tokio::test]
	async fn create_order_snapshots_prices_and_computes_totals() {
		let keyboard = product("Teclado", 10);
		let mouse = product("Mouse", 5);
		let (engine, store) = engine(vec![keyboard.clone(), mouse.clone()], false, false);

		let response = engine
			.create_order(request_for(&[(keyboard.id, 2), (mouse.id, 1)]))
			.await
			.unwrap();

		assert_eq!(response.order.total_amount, Decimal::from(25));
		assert_eq!(response.order.total_items, 3);
		assert_eq!(response.order.status, OrderStatus::Pending);
		assert_eq!(response.payment_session.url, "https://pay.test/session");

		// Snapshotted prices and names survive on the persisted order.
		let persisted = store.get(response.order.id).await.unwrap();
		assert_eq!(persisted.items.len(), 2);
		assert_eq!(persisted.items[0].price, Decimal::from(10));
		assert_eq!(persisted.items[1].price, Decimal::from(5));
		assert_eq!(response.order.items[0].name.as_deref(), Some("Teclado"));
	}

	#[tokio::test]
	async fn create_order_rejects_unknown_products_without_persisting() {
		let known = product("Teclado", 10);
		let unknown = Uuid::new_v4();
		let (engine, store) = engine(vec![known.clone()], false, false);

		let result = engine
			.create_order(request_for(&[(known.id, 2), (unknown, 1)]))
			.await;

		assert!(matches!(result, Err(OrderError::ProductValidation(_))));
		assert_eq!(store.count(None).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn create_order_surfaces_catalog_outage_without_persisting() {
		let (engine, store) = engine(vec![], true, false);

		let result = engine
			.create_order(request_for(&[(Uuid::new_v4(), 1)]))
			.await;

		assert!(matches!(result, Err(OrderError::ProductValidation(_))));
		assert_eq!(store.count(None).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn payment_failure_keeps_the_pending_order() {
		let keyboard = product("Teclado", 10);
		let (engine, store) = engine(vec![keyboard.clone()], false, true);

		let result = engine.create_order(request_for(&[(keyboard.id, 1)])).await;
		assert!(matches!(result, Err(OrderError::PaymentSession(_))));

		let persisted = store.list(None).await.unwrap();
		assert_eq!(persisted.len(), 1);
		assert_eq!(persisted[0].status, OrderStatus::Pending);
		assert!(!persisted[0].paid);
	}

	#[tokio::test]
	async fn duplicate_product_lines_each_keep_their_quantity() {
		let keyboard = product("Teclado", 10);
		let (engine, _) = engine(vec![keyboard.clone()], false, false);

		let response = engine
			.create_order(request_for(&[(keyboard.id, 1), (keyboard.id, 2)]))
			.await
			.unwrap();

		assert_eq!(response.order.items.len(), 2);
		assert_eq!(response.order.total_amount, Decimal::from(30));
		assert_eq!(response.order.total_items, 3);
	}

	#[tokio::test]
	async fn payment_event_marks_order_paid_end_to_end() {
		let keyboard = product("Teclado", 10);
		let (engine, store) = engine(vec![keyboard.clone()], false, false);

		let created = engine
			.create_order(request_for(&[(keyboard.id, 1)]))
			.await
			.unwrap();

		let event = PaymentSucceeded {
			order_id: created.order.id,
			stripe_payment_id: "ch_123".into(),
			receipt_url: "https://pay.test/receipt/1".into(),
		};
		engine.handle_payment_succeeded(event.clone()).await.unwrap();
		// Redelivery of the same event must be harmless.
		engine.handle_payment_succeeded(event).await.unwrap();

		let persisted = store.get(created.order.id).await.unwrap();
		assert_eq!(persisted.status, OrderStatus::Paid);
		assert!(persisted.paid);
		assert_eq!(persisted.stripe_charge_id.as_deref(), Some("ch_123"));
		assert_eq!(
			persisted.receipt.map(|r| r.receipt_url),
			Some("https://pay.test/receipt/1".to_string())
		);
	}
}
