use crate::{
    dto::orders::{AssignOrderRequest, CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_role},
    models::{NewOrder, Order, OrderDetail, Role},
    response::{ApiResponse, Meta},
    services::{
        lifecycle::{self, Assignee},
        pricing,
    },
    state::AppState,
};

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let orders = state.store.list_orders().await?;
    tracing::debug!(user_id = %user.user_id, count = orders.len(), "orders listed");

    let meta = Meta::new(orders.len() as i64);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    _user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = state.store.get_order_by_id(id).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(order_not_found()),
    };
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_role(user, &[Role::Admin, Role::Mesero])?;
    let command = payload.validate()?;

    let assignee = lifecycle::creation_assignee(user, command.assigned_to)?;
    if let Assignee::Requested(target) = assignee {
        let profile = state.store.find_profile(target).await?;
        lifecycle::ensure_assignable(profile.as_ref())?;
    }

    let product_ids: Vec<i64> = command.lines.iter().map(|l| l.product_id).collect();
    let products = state.store.find_products(&product_ids).await?;
    let priced = match pricing::price_lines(&pricing::price_map(&products), &command.lines) {
        Ok(priced) => priced,
        Err(AppError::MissingProducts(missing)) => {
            tracing::info!(?missing, "order references unknown products");
            return Err(AppError::MissingProducts(missing));
        }
        Err(err) => return Err(err),
    };

    let order = state
        .store
        .create_order_with_items(NewOrder {
            status: command.status,
            total: priced.total,
            created_by: user.user_id,
            assigned_to: assignee.id(),
            items: priced.items,
        })
        .await?;

    tracing::info!(
        order_id = order.id,
        created_by = %user.user_id,
        assigned_to = ?order.assigned_to,
        status = %order.status,
        total = %order.total,
        "order created"
    );

    Ok(ApiResponse::success(
        "Order created",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn assign_order(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: AssignOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;

    let target = state.store.find_profile(payload.assigned_to).await?;
    lifecycle::ensure_assignable(target.as_ref())?;

    let updated = state
        .store
        .update_assignment(id, payload.assigned_to, &lifecycle::ensure_reassignable)
        .await?;
    if updated.is_none() {
        return Err(order_not_found());
    }

    tracing::info!(order_id = id, assigned_to = %payload.assigned_to, "order assigned");
    let order = reload(state, id).await?;
    Ok(ApiResponse::success(
        "Order assigned",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_role(user, &[Role::Admin, Role::Mesero])?;
    let requested = payload.status;

    let guard = |current: &Order| lifecycle::next_status(user, current, requested);
    let updated = state.store.update_status(id, &guard).await?;
    let updated = match updated {
        Some(o) => o,
        None => return Err(order_not_found()),
    };

    tracing::info!(
        order_id = id,
        user_id = %user.user_id,
        status = %updated.status,
        "order status set"
    );
    let order = reload(state, id).await?;
    Ok(ApiResponse::success(
        "Order updated",
        order,
        Some(Meta::empty()),
    ))
}

async fn reload(state: &AppState, id: i64) -> AppResult<OrderDetail> {
    state
        .store
        .get_order_by_id(id)
        .await?
        .ok_or_else(order_not_found)
}

fn order_not_found() -> AppError {
    AppError::NotFound("Order not found".into())
}
