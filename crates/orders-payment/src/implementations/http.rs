//! HTTP implementation of the payment interface.
//!
//! Speaks the payment provider's session endpoint: a POST carrying the order
//! id, currency and line items, answered with the redirectable session
//! descriptor.

use crate::{PaymentError, PaymentInterface};
use async_trait::async_trait;
use orders_types::{PaymentSession, SessionRequest};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// HTTP client for the payment provider service.
pub struct HttpPayment {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpPayment {
	/// Creates a new HttpPayment for the given endpoint with a per-request
	/// timeout.
	pub fn new(endpoint: String, timeout: Duration) -> Result<Self, PaymentError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| PaymentError::Configuration(e.to_string()))?;

		Ok(Self { client, endpoint })
	}
}

#[async_trait]
impl PaymentInterface for HttpPayment {
	async fn create_session(
		&self,
		request: &SessionRequest,
	) -> Result<PaymentSession, PaymentError> {
		tracing::debug!(
			order_id = %request.order_id,
			items = request.items.len(),
			"Requesting payment session"
		);

		let response = self
			.client
			.post(&self.endpoint)
			.json(request)
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					PaymentError::Timeout
				} else {
					PaymentError::Unavailable(e.to_string())
				}
			})?;

		let status = response.status();
		if !status.is_success() {
			return Err(PaymentError::Unavailable(format!(
				"payment provider returned {}",
				status
			)));
		}

		response
			.json::<PaymentSession>()
			.await
			.map_err(|e| PaymentError::InvalidResponse(e.to_string()))
	}
}

/// Factory function to create a payment client from configuration.
///
/// Configuration parameters:
/// - `url`: session endpoint of the payment provider (required)
/// - `timeout_seconds`: per-request timeout (default: 5)
pub fn create_payment(
	config: &toml::Value,
) -> Result<Box<dyn PaymentInterface>, PaymentError> {
	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| PaymentError::Configuration("payment url is required".into()))?
		.to_string();

	let timeout_seconds = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	Ok(Box::new(HttpPayment::new(
		url,
		Duration::from_secs(timeout_seconds),
	)?))
}
