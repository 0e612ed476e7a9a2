//! Payment session initiator for the order lifecycle service.
//!
//! This crate opens checkout sessions with the external payment provider.
//! A session is requested exactly once per order-creation flow; retrying a
//! failed session acquisition is the caller's responsibility, against the
//! already-persisted order.

use async_trait::async_trait;
use orders_types::{PaymentSession, SessionLineItem, SessionRequest};
use thiserror::Error;
use uuid::Uuid;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

/// Errors that can occur while opening a payment session.
#[derive(Debug, Error)]
pub enum PaymentError {
	/// Error that occurs when the payment provider cannot be reached.
	#[error("Payment provider unavailable: {0}")]
	Unavailable(String),
	/// Error that occurs when the provider call exceeds its timeout.
	#[error("Payment provider timed out")]
	Timeout,
	/// Error that occurs when the provider returns an unparseable payload.
	#[error("Invalid payment provider response: {0}")]
	InvalidResponse(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface to the payment provider.
#[async_trait]
pub trait PaymentInterface: Send + Sync {
	/// Opens a checkout session for the given order and items.
	async fn create_session(
		&self,
		request: &SessionRequest,
	) -> Result<PaymentSession, PaymentError>;
}

/// Type alias for payment factory functions.
pub type PaymentFactory = fn(&toml::Value) -> Result<Box<dyn PaymentInterface>, PaymentError>;

/// Service wrapping the configured payment implementation.
///
/// Carries the currency every session is opened in, so callers only supply
/// the order id and its priced line items.
pub struct PaymentService {
	/// The underlying payment implementation.
	implementation: Box<dyn PaymentInterface>,
	/// ISO currency code used for all sessions.
	currency: String,
}

impl PaymentService {
	/// Creates a new PaymentService with the specified implementation and
	/// session currency.
	pub fn new(implementation: Box<dyn PaymentInterface>, currency: String) -> Self {
		Self {
			implementation,
			currency,
		}
	}

	/// Opens a checkout session for the given order.
	pub async fn create_session(
		&self,
		order_id: Uuid,
		items: Vec<SessionLineItem>,
	) -> Result<PaymentSession, PaymentError> {
		let request = SessionRequest {
			order_id,
			currency: self.currency.clone(),
			items,
		};
		self.implementation.create_session(&request).await
	}
}
