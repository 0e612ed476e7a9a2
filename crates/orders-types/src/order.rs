//! Order domain types.
//!
//! This module defines the persisted order aggregate (order, line items,
//! receipt), the order status enumeration, and the enriched read-side view
//! returned to callers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A persisted order with its line items.
///
/// An order is created atomically together with its line items by the
/// creation flow and afterwards mutated only by status changes and the
/// payment confirmation. Money totals are computed once at creation and
/// never recomputed, even if catalog prices change later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier for this order.
	pub id: Uuid,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Sum of `price * quantity` over all line items, fixed at creation.
	pub total_amount: Decimal,
	/// Sum of quantities over all line items, fixed at creation.
	pub total_items: u32,
	/// Whether the payment for this order has been confirmed.
	pub paid: bool,
	/// Timestamp of the payment confirmation, present iff `paid`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub paid_at: Option<DateTime<Utc>>,
	/// External payment reference, present iff `paid`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stripe_charge_id: Option<String>,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Line items belonging to this order, immutable after creation.
	pub items: Vec<OrderItem>,
	/// Receipt created when the order reached PAID. At most one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub receipt: Option<OrderReceipt>,
}

impl Order {
	/// Builds a new PENDING order from priced line items.
	///
	/// Totals are derived from the items here and nowhere else.
	pub fn new(items: Vec<OrderItem>) -> Self {
		let total_amount = items
			.iter()
			.map(|item| item.price * Decimal::from(item.quantity))
			.sum();
		let total_items = items.iter().map(|item| item.quantity).sum();

		Self {
			id: Uuid::new_v4(),
			status: OrderStatus::Pending,
			total_amount,
			total_items,
			paid: false,
			paid_at: None,
			stripe_charge_id: None,
			created_at: Utc::now(),
			items,
			receipt: None,
		}
	}

	/// Converts the order into its read-side view, resolving line item names
	/// from the given catalog products. Unknown product ids yield items
	/// without a name.
	pub fn into_response(self, names: &HashMap<Uuid, String>) -> OrderResponse {
		let items = self
			.items
			.into_iter()
			.map(|item| EnrichedOrderItem {
				name: names.get(&item.product_id).cloned(),
				product_id: item.product_id,
				price: item.price,
				quantity: item.quantity,
			})
			.collect();

		OrderResponse {
			id: self.id,
			status: self.status,
			total_amount: self.total_amount,
			total_items: self.total_items,
			paid: self.paid,
			paid_at: self.paid_at,
			stripe_charge_id: self.stripe_charge_id,
			created_at: self.created_at,
			items,
			receipt: self.receipt,
		}
	}
}

/// A priced, quantified reference to a catalog product.
///
/// The unit price is snapshotted from the catalog at order-creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
	/// Reference to the product in the external catalog.
	pub product_id: Uuid,
	/// Unit price at the moment the order was created.
	pub price: Decimal,
	/// Ordered quantity, always at least 1.
	pub quantity: u32,
}

/// Receipt attached to an order when its payment is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
	/// URL of the receipt issued by the payment provider.
	pub receipt_url: String,
}

/// Status of an order in the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	/// Order has been created and awaits payment.
	Pending,
	/// Payment for the order has been confirmed.
	Paid,
	/// Order has been cancelled.
	Cancelled,
	/// Order has been delivered to the customer.
	Delivered,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "PENDING"),
			OrderStatus::Paid => write!(f, "PAID"),
			OrderStatus::Cancelled => write!(f, "CANCELLED"),
			OrderStatus::Delivered => write!(f, "DELIVERED"),
		}
	}
}

impl FromStr for OrderStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"PENDING" => Ok(OrderStatus::Pending),
			"PAID" => Ok(OrderStatus::Paid),
			"CANCELLED" => Ok(OrderStatus::Cancelled),
			"DELIVERED" => Ok(OrderStatus::Delivered),
			other => Err(format!("unknown order status: {}", other)),
		}
	}
}

/// Read-side view of an order with line items enriched by catalog names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
	/// Unique identifier for this order.
	pub id: Uuid,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Total amount fixed at creation.
	pub total_amount: Decimal,
	/// Total quantity fixed at creation.
	pub total_items: u32,
	/// Whether the payment has been confirmed.
	pub paid: bool,
	/// Timestamp of the payment confirmation, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub paid_at: Option<DateTime<Utc>>,
	/// External payment reference, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stripe_charge_id: Option<String>,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Line items with live catalog names where resolvable.
	pub items: Vec<EnrichedOrderItem>,
	/// Receipt, present once the order reached PAID.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub receipt: Option<OrderReceipt>,
}

/// A line item annotated with the product name resolved from the catalog.
///
/// The name is absent when the catalog no longer resolves the product;
/// read paths stay usable under catalog drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOrderItem {
	/// Reference to the product in the external catalog.
	pub product_id: Uuid,
	/// Unit price snapshotted at order creation.
	pub price: Decimal,
	/// Ordered quantity.
	pub quantity: u32,
	/// Product name as currently known by the catalog.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn item(price: u64, quantity: u32) -> OrderItem {
		OrderItem {
			product_id: Uuid::new_v4(),
			price: Decimal::from(price),
			quantity,
		}
	}

	#[test]
	fn new_order_derives_totals_from_items() {
		let order = Order::new(vec![item(10, 2), item(5, 1)]);

		assert_eq!(order.total_amount, Decimal::from(25));
		assert_eq!(order.total_items, 3);
		assert_eq!(order.status, OrderStatus::Pending);
		assert!(!order.paid);
		assert!(order.paid_at.is_none());
		assert!(order.receipt.is_none());
	}

	#[test]
	fn status_round_trips_through_strings() {
		for status in [
			OrderStatus::Pending,
			OrderStatus::Paid,
			OrderStatus::Cancelled,
			OrderStatus::Delivered,
		] {
			assert_eq!(status.to_string().parse::<OrderStatus>(), Ok(status));
		}

		// Wire values are parsed case-insensitively.
		assert_eq!("pending".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
		assert!("SHIPPED".parse::<OrderStatus>().is_err());
	}

	#[test]
	fn response_resolves_names_per_item() {
		let known = item(10, 1);
		let dropped = item(5, 2);
		let mut names = HashMap::new();
		names.insert(known.product_id, "Teclado".to_string());

		let response = Order::new(vec![known.clone(), dropped.clone()]).into_response(&names);

		assert_eq!(response.items[0].name.as_deref(), Some("Teclado"));
		assert_eq!(response.items[0].product_id, known.product_id);
		assert!(response.items[1].name.is_none());
		assert_eq!(response.items[1].product_id, dropped.product_id);
	}
}
