//! Catalog Service - product CRUD, listing, and stock ownership
//!
//! Owns the Product table and the per-product lock registry. Stock and bid
//! mutation anywhere in the core goes through a lock obtained from this
//! service's registry, so catalog edits, order commits, and bids on the same
//! product serialize.

use crate::auth::{Permission, authorize};
use crate::db::{BackingStore, IdSequence, LockRegistry, WriteOp, with_timeout};
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Cart, Product, ProductCreate, ProductFilter, ProductUpdate, Role};
use std::sync::Arc;
use std::time::Duration;

/// Product store with per-product locking
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BackingStore>,
    locks: LockRegistry,
    timeout: Duration,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CatalogService {
    pub fn new(store: Arc<dyn BackingStore>, locks: LockRegistry, timeout: Duration) -> Self {
        Self {
            store,
            locks,
            timeout,
        }
    }

    /// Create a product
    ///
    /// Requires catalog management. Auction items open bidding at the listed
    /// price.
    pub async fn create_product(&self, actor_role: Role, data: ProductCreate) -> AppResult<Product> {
        authorize(actor_role, Permission::ManageCatalog)?;
        validate_price(data.price)?;
        validate_stock(data.stock)?;
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Product name must not be empty"));
        }

        let id = with_timeout(self.timeout, self.store.next_id(IdSequence::Product)).await?;
        let now = chrono::Utc::now().timestamp_millis();
        let product = Product {
            id,
            name: data.name,
            price: data.price,
            stock: data.stock,
            category: data.category,
            description: data.description,
            is_auction: data.is_auction,
            current_bid: data.is_auction.then_some(data.price),
            leading_bidder: None,
            created_at: now,
            updated_at: now,
        };
        with_timeout(
            self.timeout,
            self.store.apply(vec![WriteOp::InsertProduct(product.clone())]),
        )
        .await?;

        tracing::info!(
            product_id = id,
            name = %product.name,
            is_auction = product.is_auction,
            "Product created"
        );
        Ok(product)
    }

    /// Update a product's catalog fields
    pub async fn update_product(
        &self,
        actor_role: Role,
        id: i64,
        changes: ProductUpdate,
    ) -> AppResult<Product> {
        authorize(actor_role, Permission::ManageCatalog)?;

        let _guard = self.locks.lock(id).await;
        let mut product = self.fetch_product(id).await?;

        if let Some(name) = changes.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Product name must not be empty"));
            }
            product.name = name;
        }
        if let Some(price) = changes.price {
            validate_price(price)?;
            product.price = price;
        }
        if let Some(stock) = changes.stock {
            validate_stock(stock)?;
            product.stock = stock;
        }
        if let Some(category) = changes.category {
            product.category = category;
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        product.updated_at = chrono::Utc::now().timestamp_millis();

        with_timeout(
            self.timeout,
            self.store.apply(vec![WriteOp::UpdateProduct(product.clone())]),
        )
        .await?;
        tracing::info!(product_id = id, "Product updated");
        Ok(product)
    }

    /// Delete a product
    ///
    /// Refused while any persisted order line references the product;
    /// order history must stay resolvable.
    pub async fn delete_product(&self, actor_role: Role, id: i64) -> AppResult<()> {
        authorize(actor_role, Permission::ManageCatalog)?;

        let _guard = self.locks.lock(id).await;
        self.fetch_product(id).await?;

        let orders = with_timeout(self.timeout, self.store.list_orders()).await?;
        if let Some(order) = orders
            .iter()
            .find(|o| o.items.iter().any(|item| item.product_id == id))
        {
            return Err(AppError::new(ErrorCode::ProductReferencedByOrder)
                .with_detail("product_id", id)
                .with_detail("order_id", order.id));
        }

        with_timeout(self.timeout, self.store.apply(vec![WriteOp::DeleteProduct(id)])).await?;
        drop(_guard);
        self.locks.remove(id);
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }

    /// Point lookup
    pub async fn get_product(&self, id: i64) -> AppResult<Product> {
        self.fetch_product(id).await
    }

    /// List products, optionally filtered
    pub async fn list_products(&self, filter: Option<&ProductFilter>) -> AppResult<Vec<Product>> {
        let products = with_timeout(self.timeout, self.store.list_products()).await?;
        Ok(match filter {
            Some(filter) => products.into_iter().filter(|p| filter.matches(p)).collect(),
            None => products,
        })
    }

    /// Distinct category names, sorted
    pub async fn list_categories(&self) -> AppResult<Vec<String>> {
        let products = with_timeout(self.timeout, self.store.list_products()).await?;
        let mut categories: Vec<String> = products.into_iter().map(|p| p.category).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// Live cart subtotal at current catalog prices
    ///
    /// Recomputed on every call; prices freeze only at commit, via the order
    /// item snapshot.
    pub async fn cart_subtotal(&self, cart: &Cart) -> AppResult<Decimal> {
        let mut subtotal = Decimal::ZERO;
        for line in cart.lines() {
            let product = self.fetch_product(line.product_id).await?;
            subtotal += product.price * Decimal::from(line.quantity);
        }
        Ok(subtotal)
    }

    async fn fetch_product(&self, id: i64) -> AppResult<Product> {
        with_timeout(self.timeout, self.store.get_product(id))
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id))
    }
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO {
        return Err(AppError::new(ErrorCode::ProductInvalidPrice).with_detail("price", price.to_string()));
    }
    Ok(())
}

fn validate_stock(stock: i64) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::new(ErrorCode::ProductInvalidStock).with_detail("stock", stock));
    }
    Ok(())
}
