//! Types exchanged with the external product catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authoritative product record returned by the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
	/// Product identifier.
	pub id: Uuid,
	/// Display name of the product.
	pub name: String,
	/// Current unit price.
	pub price: Decimal,
}
