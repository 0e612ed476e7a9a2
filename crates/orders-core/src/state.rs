//! Order state machine.
//!
//! Validates and applies order status changes against the store. Explicit
//! status changes short-circuit when the order is already in the target
//! status, so retried messages cannot error or double-write. The PAID
//! transition is reserved for the payment-confirmation path and is
//! idempotent under event redelivery.

use crate::OrderError;
use chrono::Utc;
use orders_storage::{OrderStore, StorageError};
use orders_types::{Order, OrderReceipt, OrderStatus};
use std::sync::Arc;
use uuid::Uuid;

/// Manages order state transitions and persistence.
pub struct OrderStateMachine {
	store: Arc<OrderStore>,
}

impl OrderStateMachine {
	pub fn new(store: Arc<OrderStore>) -> Self {
		Self { store }
	}

	/// Loads an order, mapping storage errors into the domain taxonomy.
	async fn load(&self, id: Uuid) -> Result<Order, OrderError> {
		self.store.get(id).await.map_err(|e| match e {
			StorageError::NotFound => OrderError::NotFound(id),
			other => OrderError::Persistence(other.to_string()),
		})
	}

	/// Updates an order with a closure and persists it in one write.
	pub async fn update_order_with<F>(&self, id: Uuid, updater: F) -> Result<Order, OrderError>
	where
		F: FnOnce(&mut Order),
	{
		let mut order = self.load(id).await?;
		updater(&mut order);

		self.store.update(&order).await.map_err(|e| match e {
			StorageError::NotFound => OrderError::NotFound(id),
			other => OrderError::Persistence(other.to_string()),
		})?;

		Ok(order)
	}

	/// Applies an explicit status change.
	///
	/// When the persisted status already equals the target the order is
	/// returned unchanged without touching the store. Any other target is
	/// applied unconditionally; concurrent changes to the same order resolve
	/// last-write-wins at the store.
	pub async fn change_status(
		&self,
		id: Uuid,
		target: OrderStatus,
	) -> Result<Order, OrderError> {
		let order = self.load(id).await?;
		if order.status == target {
			return Ok(order);
		}

		tracing::info!(
			order_id = %id,
			from = %order.status,
			to = %target,
			"Changing order status"
		);

		self.update_order_with(id, |order| {
			order.status = target;
		})
		.await
	}

	/// Applies a payment confirmation: PAID status, payment fields and the
	/// receipt, all in one atomic write.
	///
	/// Safe under at-least-once event delivery: an order already paid with
	/// the same charge id is returned unchanged, so redelivery can neither
	/// error nor create a second receipt. A confirmation carrying a
	/// different charge id for an already-paid order is ignored; the first
	/// confirmation wins.
	pub async fn mark_paid(
		&self,
		id: Uuid,
		charge_id: &str,
		receipt_url: &str,
	) -> Result<Order, OrderError> {
		let order = self.load(id).await?;
		if order.paid {
			if order.stripe_charge_id.as_deref() != Some(charge_id) {
				tracing::warn!(
					order_id = %id,
					charge_id = %charge_id,
					"Order already paid under a different charge id, keeping the first confirmation"
				);
			}
			return Ok(order);
		}

		let paid_at = Utc::now();
		let order = self
			.update_order_with(id, |order| {
				order.status = OrderStatus::Paid;
				order.paid = true;
				order.paid_at = Some(paid_at);
				order.stripe_charge_id = Some(charge_id.to_string());
				order.receipt = Some(OrderReceipt {
					receipt_url: receipt_url.to_string(),
				});
			})
			.await?;

		tracing::info!(order_id = %id, charge_id = %charge_id, "Order marked as paid");
		Ok(order)
	}
}
