//! Request/response DTOs and the structured API error shape.
//!
//! Every failure crossing the service boundary is converted into an
//! `ErrorResponse { statusCode, message }` body; internal error types never
//! leak to callers.

use crate::{Order, OrderResponse, PaymentSession};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Default page number when the caller omits one.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size when the caller omits one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Inbound payload for the createOrder operation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
	/// Requested line items; at least one is required.
	#[validate(length(min = 1, message = "order must contain at least one item"), nested)]
	pub items: Vec<OrderItemRequest>,
}

/// A single requested line item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
	/// Catalog product to order.
	pub product_id: Uuid,
	/// Requested quantity, at least 1.
	#[validate(range(min = 1, message = "quantity must be at least 1"))]
	pub quantity: u32,
}

/// Inbound payload for the changeOrderStatus operation.
///
/// The status travels as its wire string and is parsed at the boundary so
/// that malformed values surface as a structured 400 instead of a transport
/// rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeOrderStatusRequest {
	/// Target status, one of PENDING, PAID, CANCELLED, DELIVERED.
	pub status: String,
}

/// Query parameters accepted by the findAllOrders operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersQuery {
	/// 1-based page number, defaults to 1.
	pub page: Option<u32>,
	/// Page size, defaults to 10.
	pub limit: Option<u32>,
	/// Optional status filter as its wire string.
	pub status: Option<String>,
}

/// Successful createOrder response: the enriched order plus the payment
/// session the caller redirects to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
	pub order: OrderResponse,
	pub payment_session: PaymentSession,
}

/// One page of orders plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
	pub data: Vec<Order>,
	pub meta: PageMeta,
}

/// Pagination metadata for list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
	/// Total number of orders matching the filter.
	pub total_items: u64,
	/// Requested page size.
	pub items_per_page: u32,
	/// Requested 1-based page number.
	pub page: u32,
	/// `ceil(total_items / items_per_page)`.
	pub total_pages: u64,
}

impl PageMeta {
	/// Computes the metadata for a page request over `total_items` matches.
	pub fn new(total_items: u64, page: u32, limit: u32) -> Self {
		Self {
			total_items,
			items_per_page: limit,
			page,
			total_pages: total_items.div_ceil(u64::from(limit)),
		}
	}
}

/// Error body returned to callers, `{statusCode, message}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
	/// HTTP status code of the failure.
	pub status_code: u16,
	/// Human-readable description.
	pub message: String,
}

/// Structured boundary error with its HTTP status mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
	/// Malformed or invalid input, rejected before orchestration runs (400).
	BadRequest(String),
	/// Referenced order does not exist (404).
	NotFound(String),
	/// A collaborator service is unreachable or timed out (503).
	ServiceUnavailable(String),
	/// Persistence or other internal failure (500).
	Internal(String),
}

impl ApiError {
	/// HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest(_) => 400,
			ApiError::NotFound(_) => 404,
			ApiError::ServiceUnavailable(_) => 503,
			ApiError::Internal(_) => 500,
		}
	}

	/// Converts into the serializable error body.
	pub fn to_error_response(&self) -> ErrorResponse {
		let message = match self {
			ApiError::BadRequest(message)
			| ApiError::NotFound(message)
			| ApiError::ServiceUnavailable(message)
			| ApiError::Internal(message) => message.clone(),
		};
		ErrorResponse {
			status_code: self.status_code(),
			message,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let response = self.to_error_response();
		write!(f, "{}: {}", response.status_code, response.message)
	}
}

impl std::error::Error for ApiError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_response())).into_response()
	}
}
