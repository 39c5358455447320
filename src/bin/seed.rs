use restaurant_pos_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    models::Role,
};
use rust_decimal::Decimal;
use uuid::Uuid;

// Profiles normally come from the identity provider's signup flow. The ids
// here must match users that exist there for tokens to resolve.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_profile(&pool, "admin@example.com", Role::Admin).await?;
    let mesero_id = ensure_profile(&pool, "mesero1@example.com", Role::Mesero).await?;
    let mesero2_id = ensure_profile(&pool, "mesero2@example.com", Role::Mesero).await?;
    seed_products(&pool).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Mesero IDs: {mesero_id}, {mesero2_id}"
    );
    Ok(())
}

async fn ensure_profile(pool: &DbPool, email: &str, role: Role) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO profiles (id, email, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured profile {email} (role={role})");
    Ok(id)
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<()> {
    let products = [
        ("Burger", Decimal::new(1000, 2)),
        ("Fries", Decimal::new(500, 2)),
        ("Lemonade", Decimal::new(350, 2)),
        ("Flan", Decimal::new(425, 2)),
    ];

    for (name, price) in products {
        sqlx::query(
            r#"
            INSERT INTO products (name, price)
            SELECT $1, $2
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)
            "#,
        )
        .bind(name)
        .bind(price)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
