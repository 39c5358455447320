use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{NewOrder, NewProduct, Order, OrderDetail, OrderItem, Product, Profile, Role},
    repository::{
        AssignGuard, CatalogRepository, OrderRepository, ProfileRepository, StatusGuard,
        assemble_details, referenced_product_ids, referenced_profile_ids,
    },
};

/// In-process store with the same referential rules as the Postgres schema.
/// Used by tests and local runs without a database.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    products: BTreeMap<i64, Product>,
    profiles: HashMap<Uuid, Profile>,
    orders: BTreeMap<i64, Order>,
    items: BTreeMap<i64, OrderItem>,
    next_product_id: i64,
    next_order_id: i64,
    next_item_id: i64,
}

impl Tables {
    fn details(&self, orders: Vec<Order>) -> Vec<OrderDetail> {
        let items: Vec<OrderItem> = self
            .items
            .values()
            .filter(|i| orders.iter().any(|o| o.id == i.order_id))
            .cloned()
            .collect();
        let profiles = referenced_profile_ids(&orders)
            .into_iter()
            .filter_map(|id| self.profiles.get(&id).cloned())
            .collect();
        let products = referenced_product_ids(&items)
            .into_iter()
            .filter_map(|id| self.products.get(&id).cloned())
            .collect();
        assemble_details(orders, items, profiles, products)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profiles are owned by the identity provider; this stands in for its
    /// registration flow.
    pub fn insert_profile(&self, profile: Profile) -> AppResult<()> {
        self.lock()?.profiles.insert(profile.id, profile);
        Ok(())
    }

    /// Removes a profile without touching orders that reference it.
    pub fn remove_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.lock()?.profiles.remove(&id))
    }

    pub fn set_product_price(&self, id: i64, price: rust_decimal::Decimal) -> AppResult<()> {
        let mut tables = self.lock()?;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;
        product.price = price;
        Ok(())
    }

    pub fn order_item_count(&self) -> AppResult<usize> {
        Ok(self.lock()?.items.len())
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store lock poisoned")))
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.lock()?.products.values().rev().cloned().collect())
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let mut tables = self.lock()?;
        tables.next_product_id += 1;
        let product = Product {
            id: tables.next_product_id,
            name: product.name,
            price: product.price,
            created_at: Utc::now(),
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_products(&self, ids: &[i64]) -> AppResult<Vec<Product>> {
        let tables = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.products.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.lock()?.profiles.get(&id).cloned())
    }

    async fn list_profiles(&self, role: Option<Role>) -> AppResult<Vec<Profile>> {
        let tables = self.lock()?;
        let mut profiles: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| role.is_none_or(|r| p.role == r))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(profiles)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order_with_items(&self, new_order: NewOrder) -> AppResult<OrderDetail> {
        let mut tables = self.lock()?;

        // Mirror the foreign keys before touching anything.
        let referenced = std::iter::once(new_order.created_by).chain(new_order.assigned_to);
        for profile_id in referenced {
            if !tables.profiles.contains_key(&profile_id) {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "orders references unknown profile {profile_id}"
                )));
            }
        }
        if let Some(item) = new_order
            .items
            .iter()
            .find(|i| !tables.products.contains_key(&i.product_id))
        {
            return Err(AppError::Internal(anyhow::anyhow!(
                "order_items references unknown product {}",
                item.product_id
            )));
        }

        tables.next_order_id += 1;
        let order = Order {
            id: tables.next_order_id,
            status: new_order.status,
            total: new_order.total,
            created_at: Utc::now(),
            created_by: new_order.created_by,
            assigned_to: new_order.assigned_to,
        };
        tables.orders.insert(order.id, order.clone());

        for item in new_order.items {
            tables.next_item_id += 1;
            let id = tables.next_item_id;
            tables.items.insert(
                id,
                OrderItem {
                    id,
                    order_id: order.id,
                    product_id: item.product_id,
                    qty: item.qty,
                    unit_price: item.unit_price,
                    line_total: item.line_total,
                },
            );
        }

        let order_id = order.id;
        tables.details(vec![order]).pop().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("order {order_id} vanished after insert"))
        })
    }

    async fn get_order_by_id(&self, id: i64) -> AppResult<Option<OrderDetail>> {
        let tables = self.lock()?;
        let order = match tables.orders.get(&id) {
            Some(o) => o.clone(),
            None => return Ok(None),
        };
        Ok(tables.details(vec![order]).pop())
    }

    async fn list_orders(&self) -> AppResult<Vec<OrderDetail>> {
        let tables = self.lock()?;
        let orders = tables.orders.values().rev().cloned().collect();
        Ok(tables.details(orders))
    }

    async fn update_assignment(
        &self,
        id: i64,
        assigned_to: Uuid,
        guard: AssignGuard<'_>,
    ) -> AppResult<Option<Order>> {
        let mut tables = self.lock()?;
        if !tables.profiles.contains_key(&assigned_to) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "orders references unknown profile {assigned_to}"
            )));
        }
        let order = match tables.orders.get_mut(&id) {
            Some(o) => o,
            None => return Ok(None),
        };
        guard(&*order)?;
        order.assigned_to = Some(assigned_to);
        Ok(Some(order.clone()))
    }

    async fn update_status(&self, id: i64, guard: StatusGuard<'_>) -> AppResult<Option<Order>> {
        let mut tables = self.lock()?;
        let order = match tables.orders.get_mut(&id) {
            Some(o) => o,
            None => return Ok(None),
        };
        if let Some(next) = guard(&*order)? {
            order.status = next;
        }
        Ok(Some(order.clone()))
    }
}
