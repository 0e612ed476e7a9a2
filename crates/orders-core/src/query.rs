//! Read-side order lookups.
//!
//! Single-order reads enrich the persisted line items with live product
//! names from the catalog; list reads return orders as persisted plus
//! pagination metadata. Read paths tolerate catalog drift: a product the
//! catalog no longer resolves renders without a name instead of failing the
//! lookup.

use crate::OrderError;
use orders_catalog::CatalogService;
use orders_storage::{OrderStore, StorageError};
use orders_types::{OrderPage, OrderResponse, OrderStatus, PageMeta};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Read-side lookups over the order store.
pub struct OrderQueryService {
	store: Arc<OrderStore>,
	catalog: Arc<CatalogService>,
}

impl OrderQueryService {
	pub fn new(store: Arc<OrderStore>, catalog: Arc<CatalogService>) -> Self {
		Self { store, catalog }
	}

	/// Fetches one order and enriches its line items with catalog names.
	///
	/// The catalog is queried without the availability requirement so that
	/// discontinued products still render in order history. Ids the catalog
	/// no longer resolves are logged and their lines returned without a
	/// name; a failed catalog call fails the read.
	pub async fn find_one(&self, id: Uuid) -> Result<OrderResponse, OrderError> {
		let order = self.store.get(id).await.map_err(|e| match e {
			StorageError::NotFound => OrderError::NotFound(id),
			other => OrderError::Persistence(other.to_string()),
		})?;

		let mut product_ids: Vec<Uuid> = Vec::with_capacity(order.items.len());
		for item in &order.items {
			if !product_ids.contains(&item.product_id) {
				product_ids.push(item.product_id);
			}
		}

		let products = self
			.catalog
			.validate_products(&product_ids, false)
			.await
			.map_err(|e| OrderError::Downstream(e.to_string()))?;

		let unresolved: Vec<String> = product_ids
			.iter()
			.filter(|product_id| !products.contains_key(product_id))
			.map(|product_id| product_id.to_string())
			.collect();
		if !unresolved.is_empty() {
			tracing::warn!(
				order_id = %id,
				"Catalog no longer resolves products: {}",
				unresolved.join(", ")
			);
		}

		let names: HashMap<Uuid, String> = products
			.into_iter()
			.map(|(product_id, product)| (product_id, product.name))
			.collect();
		Ok(order.into_response(&names))
	}

	/// Returns one page of orders matching the optional status filter.
	///
	/// `page` is 1-based; both `page` and `limit` are validated as positive
	/// at the boundary before this runs.
	pub async fn find_all(
		&self,
		page: u32,
		limit: u32,
		status: Option<OrderStatus>,
	) -> Result<OrderPage, OrderError> {
		let total_items = self
			.store
			.count(status)
			.await
			.map_err(|e| OrderError::Persistence(e.to_string()))?;

		let skip = u64::from(page.saturating_sub(1)) * u64::from(limit);
		let data = self
			.store
			.list(status)
			.await
			.map_err(|e| OrderError::Persistence(e.to_string()))?
			.into_iter()
			.skip(skip as usize)
			.take(limit as usize)
			.collect();

		Ok(OrderPage {
			data,
			meta: PageMeta::new(total_items, page, limit),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{engine, pending_order, product};
	use crate::OrderError;
	use orders_storage::OrderStore;
	use orders_types::{Order, OrderItem, OrderStatus};
	use rust_decimal::Decimal;

	#[tokio::test]
	async fn find_one_unknown_id_is_not_found() {
		let (engine, _) = engine(vec![], false, false);

		let id = Uuid::new_v4();
		let result = engine.find_one(id).await;
		assert!(matches!(result, Err(OrderError::NotFound(missing)) if missing == id));
	}

	#[tokio::test]
	async fn find_one_enriches_resolvable_items_and_tolerates_drift() {
		let keyboard = product("Teclado", 10);
		let (engine, store) = engine(vec![keyboard.clone()], false, false);

		// One resolvable product, one the catalog has since dropped.
		let dropped = Uuid::new_v4();
		let order = Order::new(vec![
			OrderItem {
				product_id: keyboard.id,
				price: Decimal::from(10),
				quantity: 1,
			},
			OrderItem {
				product_id: dropped,
				price: Decimal::from(5),
				quantity: 2,
			},
		]);
		store.insert(&order).await.unwrap();

		let response = engine.find_one(order.id).await.unwrap();

		assert_eq!(response.items[0].name.as_deref(), Some("Teclado"));
		assert!(response.items[1].name.is_none());
		// Snapshotted prices are untouched by enrichment.
		assert_eq!(response.items[1].price, Decimal::from(5));
	}

	#[tokio::test]
	async fn find_one_fails_the_read_when_the_catalog_is_down() {
		let (engine, store) = engine(vec![], true, false);
		let order = pending_order(&store).await;

		let result = engine.find_one(order.id).await;
		assert!(matches!(result, Err(OrderError::Downstream(_))));
	}

	async fn seed(store: &OrderStore, count: usize, status: OrderStatus) {
		for _ in 0..count {
			let mut order = Order::new(vec![OrderItem {
				product_id: Uuid::new_v4(),
				price: Decimal::from(1),
				quantity: 1,
			}]);
			order.status = status;
			store.insert(&order).await.unwrap();
		}
	}

	#[tokio::test]
	async fn find_all_pages_with_ceiling_metadata() {
		let (engine, store) = engine(vec![], false, false);
		seed(&store, 25, OrderStatus::Pending).await;

		let page = engine.find_all(2, 10, None).await.unwrap();

		assert_eq!(page.data.len(), 10);
		assert_eq!(page.meta.total_items, 25);
		assert_eq!(page.meta.items_per_page, 10);
		assert_eq!(page.meta.page, 2);
		assert_eq!(page.meta.total_pages, 3);

		let last = engine.find_all(3, 10, None).await.unwrap();
		assert_eq!(last.data.len(), 5);

		let beyond = engine.find_all(4, 10, None).await.unwrap();
		assert!(beyond.data.is_empty());
		assert_eq!(beyond.meta.total_pages, 3);
	}

	#[tokio::test]
	async fn find_all_filters_by_status() {
		let (engine, store) = engine(vec![], false, false);
		seed(&store, 3, OrderStatus::Pending).await;
		seed(&store, 2, OrderStatus::Cancelled).await;

		let cancelled = engine
			.find_all(1, 10, Some(OrderStatus::Cancelled))
			.await
			.unwrap();

		assert_eq!(cancelled.meta.total_items, 2);
		assert_eq!(cancelled.data.len(), 2);
		assert!(cancelled
			.data
			.iter()
			.all(|order| order.status == OrderStatus::Cancelled));
	}

	#[tokio::test]
	async fn find_all_on_empty_store_is_an_empty_page() {
		let (engine, _) = engine(vec![], false, false);

		let page = engine.find_all(1, 10, None).await.unwrap();

		assert!(page.data.is_empty());
		assert_eq!(page.meta.total_items, 0);
		assert_eq!(page.meta.total_pages, 0);
	}
}
