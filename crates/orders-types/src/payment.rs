//! Types exchanged with the external payment provider.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for opening a payment session for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
	/// The order the session pays for.
	pub order_id: Uuid,
	/// ISO currency code, e.g. "usd".
	pub currency: String,
	/// Priced line items shown on the provider's checkout page.
	pub items: Vec<SessionLineItem>,
}

/// A line item as presented to the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLineItem {
	/// Display name of the product.
	pub name: String,
	/// Unit price snapshotted on the order.
	pub price: Decimal,
	/// Ordered quantity.
	pub quantity: u32,
}

/// Redirectable payment session descriptor returned by the provider.
///
/// Field names are snake_case on the wire, matching the provider contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSession {
	/// URL the customer is sent to when cancelling checkout.
	pub cancel_url: String,
	/// URL the customer is sent to after a successful checkout.
	pub success_url: String,
	/// URL of the hosted checkout page.
	pub url: String,
}
