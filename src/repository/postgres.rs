use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
        profiles::{Column as ProfileCol, Entity as Profiles, Model as ProfileModel},
    },
    error::{AppError, AppResult},
    models::{
        NewOrder, NewProduct, Order, OrderDetail, OrderItem, OrderStatus, Product, Profile, Role,
    },
    repository::{
        AssignGuard, CatalogRepository, OrderRepository, ProfileRepository, StatusGuard,
        assemble_details, referenced_product_ids, referenced_profile_ids,
    },
};

/// Postgres-backed store built on SeaORM.
#[derive(Clone)]
pub struct SeaOrmStore {
    orm: OrmConn,
}

impl SeaOrmStore {
    pub fn new(orm: OrmConn) -> Self {
        Self { orm }
    }

    pub fn connection(&self) -> &OrmConn {
        &self.orm
    }

    async fn load_details<C: ConnectionTrait>(
        &self,
        conn: &C,
        orders: Vec<OrderModel>,
    ) -> AppResult<Vec<OrderDetail>> {
        let orders = orders
            .into_iter()
            .map(order_from_entity)
            .collect::<AppResult<Vec<_>>>()?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let items: Vec<OrderItem> = OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(order_ids))
            .order_by_asc(OrderItemCol::Id)
            .all(conn)
            .await?
            .into_iter()
            .map(order_item_from_entity)
            .collect();

        let profile_ids = referenced_profile_ids(&orders);
        let profiles = Profiles::find()
            .filter(ProfileCol::Id.is_in(profile_ids))
            .all(conn)
            .await?
            .into_iter()
            .filter_map(|model| match profile_from_entity(model) {
                Ok(profile) => Some(profile),
                Err(err) => {
                    tracing::warn!(error = ?err, "skipping profile with unknown role");
                    None
                }
            })
            .collect();

        let product_ids = referenced_product_ids(&items);
        let products = if product_ids.is_empty() {
            Vec::new()
        } else {
            Products::find()
                .filter(ProdCol::Id.is_in(product_ids))
                .all(conn)
                .await?
                .into_iter()
                .map(product_from_entity)
                .collect()
        };

        Ok(assemble_details(orders, items, profiles, products))
    }
}

#[async_trait]
impl CatalogRepository for SeaOrmStore {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let products = Products::find()
            .order_by_desc(ProdCol::Id)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(products)
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let active = ProductActive {
            id: NotSet,
            name: Set(product.name),
            price: Set(product.price),
            created_at: NotSet,
        };
        let product = active.insert(&self.orm).await?;
        Ok(product_from_entity(product))
    }

    async fn find_products(&self, ids: &[i64]) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products = Products::find()
            .filter(ProdCol::Id.is_in(ids.iter().copied()))
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(products)
    }
}

#[async_trait]
impl ProfileRepository for SeaOrmStore {
    async fn find_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Profiles::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(profile_from_entity)
            .transpose()
    }

    async fn list_profiles(&self, role: Option<Role>) -> AppResult<Vec<Profile>> {
        let mut finder = Profiles::find().order_by_asc(ProfileCol::Email);
        if let Some(role) = role {
            finder = finder.filter(ProfileCol::Role.eq(role.as_str()));
        }
        finder
            .all(&self.orm)
            .await?
            .into_iter()
            .map(profile_from_entity)
            .collect()
    }
}

#[async_trait]
impl OrderRepository for SeaOrmStore {
    async fn create_order_with_items(&self, new_order: NewOrder) -> AppResult<OrderDetail> {
        let txn = self.orm.begin().await?;

        let order = OrderActive {
            id: NotSet,
            status: Set(new_order.status.as_str().to_owned()),
            total: Set(new_order.total),
            created_at: Set(Utc::now().into()),
            created_by: Set(new_order.created_by),
            assigned_to: Set(new_order.assigned_to),
        }
        .insert(&txn)
        .await?;

        for item in &new_order.items {
            OrderItemActive {
                id: NotSet,
                order_id: Set(order.id),
                product_id: Set(item.product_id),
                qty: Set(item.qty),
                unit_price: Set(item.unit_price),
                line_total: Set(item.line_total),
            }
            .insert(&txn)
            .await?;
        }

        let order_id = order.id;
        let mut details = self.load_details(&txn, vec![order]).await?;

        txn.commit().await?;

        details.pop().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("order {order_id} vanished after insert"))
        })
    }

    async fn get_order_by_id(&self, id: i64) -> AppResult<Option<OrderDetail>> {
        let order = match Orders::find_by_id(id).one(&self.orm).await? {
            Some(o) => o,
            None => return Ok(None),
        };
        let mut details = self.load_details(&self.orm, vec![order]).await?;
        Ok(details.pop())
    }

    async fn list_orders(&self) -> AppResult<Vec<OrderDetail>> {
        let orders = Orders::find()
            .order_by_desc(OrderCol::Id)
            .all(&self.orm)
            .await?;
        self.load_details(&self.orm, orders).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        assigned_to: Uuid,
        guard: AssignGuard<'_>,
    ) -> AppResult<Option<Order>> {
        let txn = self.orm.begin().await?;

        let existing = Orders::find_by_id(id)
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let existing = match existing {
            Some(o) => o,
            None => return Ok(None),
        };

        guard(&order_from_entity(existing.clone())?)?;

        let mut active: OrderActive = existing.into();
        active.assigned_to = Set(Some(assigned_to));
        let order = active.update(&txn).await?;

        txn.commit().await?;
        order_from_entity(order).map(Some)
    }

    async fn update_status(&self, id: i64, guard: StatusGuard<'_>) -> AppResult<Option<Order>> {
        let txn = self.orm.begin().await?;

        let existing = Orders::find_by_id(id)
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let existing = match existing {
            Some(o) => o,
            None => return Ok(None),
        };

        let current = order_from_entity(existing.clone())?;
        let order = match guard(&current)? {
            Some(next) if next != current.status => {
                let mut active: OrderActive = existing.into();
                active.status = Set(next.as_str().to_owned());
                order_from_entity(active.update(&txn).await?)?
            }
            _ => current,
        };

        txn.commit().await?;
        Ok(Some(order))
    }
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = model
        .status
        .parse::<OrderStatus>()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!("order {}: {e}", model.id)))?;
    Ok(Order {
        id: model.id,
        status,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
        created_by: model.created_by,
        assigned_to: model.assigned_to,
    })
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        qty: model.qty,
        unit_price: model.unit_price,
        line_total: model.line_total,
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn profile_from_entity(model: ProfileModel) -> AppResult<Profile> {
    let role = model
        .role
        .parse::<Role>()
        .map_err(|e: String| AppError::UnknownRole(format!("profile {}: {e}", model.id)))?;
    Ok(Profile {
        id: model.id,
        email: model.email,
        role,
    })
}
