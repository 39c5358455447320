#![allow(dead_code)]

use std::sync::Arc;

use restaurant_pos_api::{
    dto::orders::{CreateOrderRequest, OrderItemRequest},
    identity::{Claims, JwtIdentityResolver},
    middleware::auth::AuthUser,
    models::{NewProduct, OrderStatus, Product, Profile, Role},
    repository::{CatalogRepository, MemoryStore, Store},
    state::AppState,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub admin: AuthUser,
    pub u1: AuthUser,
    pub u2: AuthUser,
    pub burger: Product,
    pub fries: Product,
}

/// Burger 10.00 and Fries 5.00 on the menu, one admin and two meseros.
pub async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn Store> = store.clone();
    let identity = Arc::new(JwtIdentityResolver::new(JWT_SECRET, None, dyn_store.clone()));
    let state = AppState::new(dyn_store, identity);

    let admin = staff(&store, "admin@example.com", Role::Admin);
    let u1 = staff(&store, "u1@example.com", Role::Mesero);
    let u2 = staff(&store, "u2@example.com", Role::Mesero);

    let burger = store
        .create_product(NewProduct {
            name: "Burger".into(),
            price: Decimal::new(1000, 2),
        })
        .await
        .expect("burger");
    let fries = store
        .create_product(NewProduct {
            name: "Fries".into(),
            price: Decimal::new(500, 2),
        })
        .await
        .expect("fries");

    Fixture {
        store,
        state,
        admin,
        u1,
        u2,
        burger,
        fries,
    }
}

fn staff(store: &MemoryStore, email: &str, role: Role) -> AuthUser {
    let id = Uuid::new_v4();
    store
        .insert_profile(Profile {
            id,
            email: email.into(),
            role,
        })
        .expect("insert profile");
    AuthUser {
        user_id: id,
        email: email.into(),
        role,
    }
}

pub fn order_request(
    status: Option<OrderStatus>,
    assigned_to: Option<Uuid>,
    items: &[(i64, i32)],
) -> CreateOrderRequest {
    CreateOrderRequest {
        status,
        assigned_to,
        items: items
            .iter()
            .map(|&(product_id, qty)| OrderItemRequest { product_id, qty })
            .collect(),
    }
}

/// Mints an HS256 access token the way the identity provider would.
pub fn token_for(sub: &str, secret: &str, ttl_secs: i64) -> String {
    let exp = (chrono::Utc::now() + chrono::Duration::seconds(ttl_secs)).timestamp() as usize;
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &Claims {
            sub: sub.to_string(),
            exp,
        },
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode token")
}

pub fn bearer(user: &AuthUser) -> String {
    format!("Bearer {}", token_for(&user.user_id.to_string(), JWT_SECRET, 3600))
}
