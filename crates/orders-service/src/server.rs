//! HTTP server for the orders service.
//!
//! Exposes the inbound operations as a route table built once at startup and
//! converts every failure into the structured `{statusCode, message}` body
//! before it crosses back to the caller. Syntactic validation happens here,
//! ahead of the orchestration.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
	routing::{get, patch, post},
	Router,
};
use orders_core::OrderEngine;
use orders_types::{
	ApiError, ChangeOrderStatusRequest, CreateOrderRequest, CreateOrderResponse, Order,
	OrderPage, OrderResponse, OrderStatus, OrdersQuery, PaymentSucceeded, DEFAULT_LIMIT,
	DEFAULT_PAGE,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use uuid::Uuid;
use validator::Validate;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the order engine for processing requests.
	pub engine: Arc<OrderEngine>,
}

/// Starts the HTTP server for the inbound operations.
///
/// The router is the service's dispatch table: each operation name maps to
/// its handler function exactly once, at startup.
pub async fn start_server(engine: Arc<OrderEngine>) -> Result<(), Box<dyn std::error::Error>> {
	let api_config = engine.config().api.clone();
	let app_state = AppState { engine };

	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders", post(handle_create_order).get(handle_find_all))
				.route("/orders/{id}", get(handle_find_one))
				.route("/orders/{id}/status", patch(handle_change_status))
				.route(
					"/events/payment-succeeded",
					post(handle_payment_succeeded),
				),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Orders API server starting on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::warn!("Failed to listen for shutdown signal: {}", e);
	}
}

/// Handles POST /api/orders requests (createOrder).
async fn handle_create_order(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
	request
		.validate()
		.map_err(|e| ApiError::BadRequest(e.to_string()))?;

	match state.engine.create_order(request).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Order creation failed: {}", e);
			Err(ApiError::from(e))
		}
	}
}

/// Handles GET /api/orders requests (findAllOrders).
async fn handle_find_all(
	State(state): State<AppState>,
	Query(query): Query<OrdersQuery>,
) -> Result<Json<OrderPage>, ApiError> {
	let page = query.page.unwrap_or(DEFAULT_PAGE);
	let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
	if page == 0 || limit == 0 {
		return Err(ApiError::BadRequest(
			"page and limit must be positive".to_string(),
		));
	}
	let status = parse_status(query.status.as_deref())?;

	match state.engine.find_all(page, limit, status).await {
		Ok(page) => Ok(Json(page)),
		Err(e) => {
			tracing::warn!("Order listing failed: {}", e);
			Err(ApiError::from(e))
		}
	}
}

/// Handles GET /api/orders/{id} requests (findOneOrder).
async fn handle_find_one(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
	let id = parse_order_id(&id)?;

	match state.engine.find_one(id).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!(order_id = %id, "Order retrieval failed: {}", e);
			Err(ApiError::from(e))
		}
	}
}

/// Handles PATCH /api/orders/{id}/status requests (changeOrderStatus).
async fn handle_change_status(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<ChangeOrderStatusRequest>,
) -> Result<Json<Order>, ApiError> {
	let id = parse_order_id(&id)?;
	let status = request
		.status
		.parse::<OrderStatus>()
		.map_err(ApiError::BadRequest)?;

	match state.engine.change_status(id, status).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!(order_id = %id, "Status change failed: {}", e);
			Err(ApiError::from(e))
		}
	}
}

/// Handles POST /api/events/payment-succeeded (paymentSucceeded event).
///
/// Fire-and-forget: the event is acknowledged immediately and applied on a
/// detached task. Failures are logged, never returned; the transport
/// redelivers and the PAID transition is idempotent.
async fn handle_payment_succeeded(
	State(state): State<AppState>,
	Json(event): Json<PaymentSucceeded>,
) -> StatusCode {
	let engine = Arc::clone(&state.engine);
	tokio::spawn(async move {
		let order_id = event.order_id;
		if let Err(e) = engine.handle_payment_succeeded(event).await {
			tracing::warn!(
				order_id = %order_id,
				"Payment confirmation failed, relying on redelivery: {}",
				e
			);
		}
	});

	StatusCode::ACCEPTED
}

fn parse_order_id(raw: &str) -> Result<Uuid, ApiError> {
	Uuid::parse_str(raw)
		.map_err(|_| ApiError::BadRequest(format!("\"{}\" is not a valid order id", raw)))
}

fn parse_status(raw: Option<&str>) -> Result<Option<OrderStatus>, ApiError> {
	raw.map(str::parse::<OrderStatus>)
		.transpose()
		.map_err(ApiError::BadRequest)
}
