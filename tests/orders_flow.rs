mod common;

use common::{fixture, order_request};
use restaurant_pos_api::{
    dto::{
        orders::{AssignOrderRequest, UpdateOrderStatusRequest},
        products::CreateProductRequest,
        profiles::ProfileQuery,
    },
    error::AppError,
    models::{OrderStatus, Role},
    services::{order_service, product_service, profile_service},
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn status(status: OrderStatus) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest { status }
}

#[tokio::test]
async fn mesero_order_is_priced_from_catalog_and_self_assigned() -> anyhow::Result<()> {
    let fx = fixture().await;

    let resp = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, None, &[(fx.burger.id, 2), (fx.fries.id, 1)]),
    )
    .await?;
    let order = resp.data.expect("order");

    assert_eq!(order.total, Decimal::new(2500, 2));
    assert_eq!(order.status, OrderStatus::Saved);
    assert_eq!(order.created_by, fx.u1.user_id);
    assert_eq!(order.assigned_to, Some(fx.u1.user_id));
    assert_eq!(
        order.assigned_to_profile.as_ref().map(|p| p.email.as_str()),
        Some("u1@example.com")
    );

    assert_eq!(order.order_items.len(), 2);
    for item in &order.order_items {
        assert_eq!(item.line_total, item.unit_price * Decimal::from(item.qty));
        assert!(item.product.is_some());
    }
    let sum: Decimal = order.order_items.iter().map(|i| i.line_total).sum();
    assert_eq!(sum, order.total);
    Ok(())
}

#[tokio::test]
async fn mesero_may_name_themselves_but_nobody_else() -> anyhow::Result<()> {
    let fx = fixture().await;

    let own = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, Some(fx.u1.user_id), &[(fx.burger.id, 1)]),
    )
    .await?;
    assert_eq!(own.data.unwrap().assigned_to, Some(fx.u1.user_id));

    for target in [fx.u2.user_id, fx.admin.user_id, Uuid::new_v4()] {
        let err = order_service::create_order(
            &fx.state,
            &fx.u1,
            order_request(None, Some(target), &[(fx.burger.id, 1)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(err.to_string(), "Mesero can only assign to self");
    }

    let listed = order_service::list_orders(&fx.state, &fx.u1).await?;
    assert_eq!(listed.data.unwrap().items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn admin_creates_unassigned_or_for_a_mesero() -> anyhow::Result<()> {
    let fx = fixture().await;

    let unassigned = order_service::create_order(
        &fx.state,
        &fx.admin,
        order_request(None, None, &[(fx.fries.id, 3)]),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(unassigned.assigned_to, None);
    assert!(unassigned.assigned_to_profile.is_none());
    assert_eq!(unassigned.total, Decimal::new(1500, 2));

    let for_waiter = order_service::create_order(
        &fx.state,
        &fx.admin,
        order_request(None, Some(fx.u2.user_id), &[(fx.fries.id, 1)]),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(for_waiter.assigned_to, Some(fx.u2.user_id));
    assert_eq!(for_waiter.created_by, fx.admin.user_id);
    Ok(())
}

#[tokio::test]
async fn admin_cannot_create_for_admin_or_stranger() {
    let fx = fixture().await;

    let err = order_service::create_order(
        &fx.state,
        &fx.admin,
        order_request(None, Some(fx.admin.user_id), &[(fx.fries.id, 1)]),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Assigned user must be mesero");

    let err = order_service::create_order(
        &fx.state,
        &fx.admin,
        order_request(None, Some(Uuid::new_v4()), &[(fx.fries.id, 1)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(err.to_string(), "Assigned user not found");
}

#[tokio::test]
async fn unknown_products_leave_nothing_behind() -> anyhow::Result<()> {
    let fx = fixture().await;

    let err = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, None, &[(fx.burger.id, 1), (404, 2), (405, 1)]),
    )
    .await
    .unwrap_err();
    match err {
        AppError::MissingProducts(ids) => assert_eq!(ids, vec![404, 405]),
        other => panic!("unexpected error: {other:?}"),
    }

    let listed = order_service::list_orders(&fx.state, &fx.admin).await?;
    assert!(listed.data.unwrap().items.is_empty());
    assert_eq!(fx.store.order_item_count()?, 0);
    Ok(())
}

#[tokio::test]
async fn invalid_items_fail_before_any_lookup() {
    let fx = fixture().await;

    let err = order_service::create_order(&fx.state, &fx.u1, order_request(None, None, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, None, &[(fx.burger.id, 0)]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn unit_price_is_a_snapshot() -> anyhow::Result<()> {
    let fx = fixture().await;

    let order = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, None, &[(fx.burger.id, 1)]),
    )
    .await?
    .data
    .unwrap();

    fx.store.set_product_price(fx.burger.id, Decimal::new(1250, 2))?;

    let reread = order_service::get_order(&fx.state, &fx.u1, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(reread.total, Decimal::new(1000, 2));
    assert_eq!(reread.order_items[0].unit_price, Decimal::new(1000, 2));

    let next = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, None, &[(fx.burger.id, 1)]),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(next.total, Decimal::new(1250, 2));
    Ok(())
}

#[tokio::test]
async fn orders_can_be_created_closed_by_any_role() -> anyhow::Result<()> {
    let fx = fixture().await;

    for user in [&fx.u1, &fx.admin] {
        let order = order_service::create_order(
            &fx.state,
            user,
            order_request(Some(OrderStatus::Closed), None, &[(fx.fries.id, 1)]),
        )
        .await?
        .data
        .unwrap();
        assert_eq!(order.status, OrderStatus::Closed);
    }
    Ok(())
}

#[tokio::test]
async fn list_orders_is_newest_first() -> anyhow::Result<()> {
    let fx = fixture().await;

    let mut created = Vec::new();
    for qty in 1..=3 {
        let order = order_service::create_order(
            &fx.state,
            &fx.u1,
            order_request(None, None, &[(fx.fries.id, qty)]),
        )
        .await?
        .data
        .unwrap();
        created.push(order.id);
    }

    let resp = order_service::list_orders(&fx.state, &fx.u2).await?;
    assert_eq!(resp.meta.unwrap().total, Some(3));
    let ids: Vec<i64> = resp.data.unwrap().items.iter().map(|o| o.id).collect();
    created.reverse();
    assert_eq!(ids, created);
    Ok(())
}

#[tokio::test]
async fn missing_profiles_read_as_null() -> anyhow::Result<()> {
    let fx = fixture().await;

    let order = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, None, &[(fx.fries.id, 1)]),
    )
    .await?
    .data
    .unwrap();
    fx.store.remove_profile(fx.u1.user_id)?;

    let reread = order_service::get_order(&fx.state, &fx.admin, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(reread.assigned_to, Some(fx.u1.user_id));
    assert!(reread.assigned_to_profile.is_none());
    assert!(reread.created_by_profile.is_none());
    Ok(())
}

#[tokio::test]
async fn admin_reassigns_to_mesero_only() -> anyhow::Result<()> {
    let fx = fixture().await;
    let order = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, None, &[(fx.burger.id, 1)]),
    )
    .await?
    .data
    .unwrap();

    let err = order_service::assign_order(
        &fx.state,
        &fx.admin,
        order.id,
        AssignOrderRequest {
            assigned_to: fx.admin.user_id,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Assigned user must be mesero");

    let moved = order_service::assign_order(
        &fx.state,
        &fx.admin,
        order.id,
        AssignOrderRequest {
            assigned_to: fx.u2.user_id,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(moved.assigned_to, Some(fx.u2.user_id));
    assert_eq!(moved.status, OrderStatus::Saved);
    assert_eq!(moved.total, order.total);

    let reread = order_service::get_order(&fx.state, &fx.u2, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(reread.assigned_to, Some(fx.u2.user_id));
    assert_eq!(reread.order_items, order.order_items);
    Ok(())
}

#[tokio::test]
async fn assignment_rejections() -> anyhow::Result<()> {
    let fx = fixture().await;
    let order = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(Some(OrderStatus::Closed), None, &[(fx.burger.id, 1)]),
    )
    .await?
    .data
    .unwrap();

    let err = order_service::assign_order(
        &fx.state,
        &fx.u1,
        order.id,
        AssignOrderRequest {
            assigned_to: fx.u1.user_id,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = order_service::assign_order(
        &fx.state,
        &fx.admin,
        9999,
        AssignOrderRequest {
            assigned_to: fx.u2.user_id,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = order_service::assign_order(
        &fx.state,
        &fx.admin,
        order.id,
        AssignOrderRequest {
            assigned_to: fx.u2.user_id,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    Ok(())
}

#[tokio::test]
async fn assigned_waiter_closes_and_reclose_is_a_no_op() -> anyhow::Result<()> {
    let fx = fixture().await;
    let order = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, None, &[(fx.burger.id, 1)]),
    )
    .await?
    .data
    .unwrap();

    let err = order_service::update_order_status(
        &fx.state,
        &fx.u1,
        order.id,
        status(OrderStatus::Saved),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let closed = order_service::update_order_status(
        &fx.state,
        &fx.u1,
        order.id,
        status(OrderStatus::Closed),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(closed.status, OrderStatus::Closed);

    for user in [&fx.u1, &fx.admin] {
        let again = order_service::update_order_status(
            &fx.state,
            user,
            order.id,
            status(OrderStatus::Closed),
        )
        .await?
        .data
        .unwrap();
        assert_eq!(again.status, OrderStatus::Closed);

        let err = order_service::update_order_status(
            &fx.state,
            user,
            order.id,
            status(OrderStatus::Saved),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "Closed orders cannot be reopened");
    }
    Ok(())
}

#[tokio::test]
async fn admin_reopening_closed_order_conflicts() -> anyhow::Result<()> {
    let fx = fixture().await;
    let order = order_service::create_order(
        &fx.state,
        &fx.admin,
        order_request(None, None, &[(fx.fries.id, 2)]),
    )
    .await?
    .data
    .unwrap();

    order_service::update_order_status(&fx.state, &fx.admin, order.id, status(OrderStatus::Closed))
        .await?;

    let err = order_service::update_order_status(
        &fx.state,
        &fx.admin,
        order.id,
        status(OrderStatus::Saved),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    Ok(())
}

#[tokio::test]
async fn other_waiter_is_forbidden_for_every_status() -> anyhow::Result<()> {
    let fx = fixture().await;
    let order = order_service::create_order(
        &fx.state,
        &fx.u1,
        order_request(None, None, &[(fx.burger.id, 1)]),
    )
    .await?
    .data
    .unwrap();

    for requested in [OrderStatus::Saved, OrderStatus::Closed] {
        let err =
            order_service::update_order_status(&fx.state, &fx.u2, order.id, status(requested))
                .await
                .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    let unchanged = order_service::get_order(&fx.state, &fx.u1, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(unchanged.status, OrderStatus::Saved);
    Ok(())
}

#[tokio::test]
async fn status_of_missing_order_is_not_found() {
    let fx = fixture().await;

    let err = order_service::update_order_status(
        &fx.state,
        &fx.admin,
        42,
        status(OrderStatus::Closed),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn catalog_management_is_admin_only() -> anyhow::Result<()> {
    let fx = fixture().await;

    let err = product_service::create_product(
        &fx.state,
        &fx.u1,
        CreateProductRequest {
            name: "Soup".into(),
            price: Decimal::new(650, 2),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let soup = product_service::create_product(
        &fx.state,
        &fx.admin,
        CreateProductRequest {
            name: " Soup ".into(),
            price: Decimal::new(650, 2),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(soup.name, "Soup");

    let listed = product_service::list_products(&fx.state).await?.data.unwrap();
    let ids: Vec<i64> = listed.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![soup.id, fx.fries.id, fx.burger.id]);
    Ok(())
}

#[tokio::test]
async fn profiles_filter_by_role_for_admin() -> anyhow::Result<()> {
    let fx = fixture().await;

    let meseros = profile_service::list_profiles(
        &fx.state,
        &fx.admin,
        ProfileQuery {
            role: Some("mesero".into()),
        },
    )
    .await?
    .data
    .unwrap();
    let emails: Vec<&str> = meseros.items.iter().map(|p| p.email.as_str()).collect();
    assert_eq!(emails, vec!["u1@example.com", "u2@example.com"]);
    assert!(meseros.items.iter().all(|p| p.role == Role::Mesero));

    let err = profile_service::list_profiles(
        &fx.state,
        &fx.admin,
        ProfileQuery {
            role: Some("chef".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = profile_service::list_profiles(&fx.state, &fx.u1, ProfileQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    Ok(())
}
