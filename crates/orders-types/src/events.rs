//! Asynchronous event payloads consumed by the service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment confirmation event emitted by the payment provider integration.
///
/// Delivered at least once; the handler applying it is idempotent, so
/// redelivery is safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSucceeded {
	/// The order whose payment was confirmed.
	pub order_id: Uuid,
	/// External payment reference recorded on the order.
	pub stripe_payment_id: String,
	/// URL of the receipt issued by the provider.
	pub receipt_url: String,
}
