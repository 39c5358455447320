//! Persistence seams for the catalog, the profiles and the order aggregate.
//!
//! Services only talk to [`Store`]; the Postgres implementation lives in
//! [`postgres`] and an in-process one in [`memory`].

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        NewOrder, NewProduct, Order, OrderDetail, OrderItem, OrderItemDetail, OrderStatus,
        Product, Profile, Role,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::SeaOrmStore;

/// Decides the status an order moves to, given its locked current row.
/// `Ok(None)` leaves the row untouched.
pub type StatusGuard<'a> = &'a (dyn Fn(&Order) -> AppResult<Option<OrderStatus>> + Send + Sync);

/// Vetoes a reassignment, given the locked current row.
pub type AssignGuard<'a> = &'a (dyn Fn(&Order) -> AppResult<()> + Send + Sync);

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All products, newest id first.
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;

    /// Products whose id is in `ids`. Unknown ids are simply absent.
    async fn find_products(&self, ids: &[i64]) -> AppResult<Vec<Product>>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profile(&self, id: Uuid) -> AppResult<Option<Profile>>;

    /// Profiles ordered by email, optionally restricted to one role.
    async fn list_profiles(&self, role: Option<Role>) -> AppResult<Vec<Profile>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order and all of its items in one transaction and
    /// returns the enriched result.
    async fn create_order_with_items(&self, order: NewOrder) -> AppResult<OrderDetail>;

    async fn get_order_by_id(&self, id: i64) -> AppResult<Option<OrderDetail>>;

    /// Every order, newest id first.
    async fn list_orders(&self) -> AppResult<Vec<OrderDetail>>;

    /// Locks the order row, runs `guard` and sets `assigned_to`.
    /// Returns `None` when the order does not exist.
    async fn update_assignment(
        &self,
        id: i64,
        assigned_to: Uuid,
        guard: AssignGuard<'_>,
    ) -> AppResult<Option<Order>>;

    /// Locks the order row, asks `guard` for the next status and writes it
    /// when it differs. Returns `None` when the order does not exist.
    async fn update_status(&self, id: i64, guard: StatusGuard<'_>) -> AppResult<Option<Order>>;
}

pub trait Store: CatalogRepository + ProfileRepository + OrderRepository {}

impl<T> Store for T where T: CatalogRepository + ProfileRepository + OrderRepository {}

/// Distinct creator and assignee ids referenced by `orders`.
pub(crate) fn referenced_profile_ids(orders: &[Order]) -> Vec<Uuid> {
    orders
        .iter()
        .flat_map(|o| std::iter::once(o.created_by).chain(o.assigned_to))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub(crate) fn referenced_product_ids(items: &[OrderItem]) -> Vec<i64> {
    items
        .iter()
        .map(|i| i.product_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Joins raw rows into [`OrderDetail`]s, keeping the order of `orders`.
pub(crate) fn assemble_details(
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    profiles: Vec<Profile>,
    products: Vec<Product>,
) -> Vec<OrderDetail> {
    let profiles: HashMap<Uuid, Profile> = profiles.into_iter().map(|p| (p.id, p)).collect();
    let products: HashMap<i64, Product> = products.into_iter().map(|p| (p.id, p)).collect();

    let mut items_by_order: HashMap<i64, Vec<OrderItemDetail>> = HashMap::new();
    for item in items {
        items_by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderItemDetail {
                id: item.id,
                order_id: item.order_id,
                product_id: item.product_id,
                qty: item.qty,
                unit_price: item.unit_price,
                line_total: item.line_total,
                product: products.get(&item.product_id).cloned(),
            });
    }

    orders
        .into_iter()
        .map(|order| {
            let mut order_items = items_by_order.remove(&order.id).unwrap_or_default();
            order_items.sort_by_key(|i| i.id);
            OrderDetail {
                created_by_profile: profiles.get(&order.created_by).cloned(),
                assigned_to_profile: order.assigned_to.and_then(|id| profiles.get(&id).cloned()),
                id: order.id,
                status: order.status,
                total: order.total,
                created_at: order.created_at,
                created_by: order.created_by,
                assigned_to: order.assigned_to,
                order_items,
            }
        })
        .collect()
}
