use axum_marketplace_api::{
    config::AppConfig, db::create_pool, services::auth_service::hash_password, slugs,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_account(&pool, "admin@example.com", "admin12345", "Site", "Admin", true).await?;
    let buyer_id = ensure_account(&pool, "buyer@example.com", "buyer12345", "Betty", "Buyer", false).await?;
    let seller_user_id =
        ensure_account(&pool, "seller@example.com", "seller12345", "Sam", "Seller", false).await?;
    let seller_id = ensure_seller(&pool, seller_user_id, "Sams Supplies").await?;
    seed_catalog(&pool, seller_id).await?;

    println!("Seed completed. Admin: {admin_id}, Buyer: {buyer_id}, Seller: {seller_id}");
    Ok(())
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
    is_staff: bool,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, is_staff)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET is_staff = EXCLUDED.is_staff
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(is_staff)
    .fetch_one(pool)
    .await?;

    println!("Ensured account {email}");
    Ok(id)
}

async fn ensure_seller(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    business_name: &str,
) -> anyhow::Result<Uuid> {
    sqlx::query("UPDATE users SET account_type = 'SELLER' WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO sellers (user_id, business_name, slug, is_approved)
        VALUES ($1, $2, $3, TRUE)
        ON CONFLICT (user_id) DO UPDATE SET is_approved = TRUE
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(business_name)
    .bind(slugs::slugify(business_name))
    .fetch_one(pool)
    .await?;

    println!("Ensured seller {business_name}");
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool, seller_id: Uuid) -> anyhow::Result<()> {
    let categories = [
        ("Electronics", "https://img.example.com/cat/electronics.png"),
        ("Books", "https://img.example.com/cat/books.png"),
        ("Fashion", "https://img.example.com/cat/fashion.png"),
    ];

    let mut category_ids = Vec::new();
    for (name, image) in categories {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO categories (name, slug, image)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET image = EXCLUDED.image
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(slugs::slugify(name))
        .bind(image)
        .fetch_one(pool)
        .await?;
        category_ids.push(id);
    }

    let products = [
        ("Noise Cancelling Headphones", 0, "Over-ear, 30 hour battery", 1450000_i64, 25),
        ("Mechanical Keyboard", 0, "Hot-swappable switches", 890000_i64, 40),
        ("Systems Programming Handbook", 1, "From registers to runtimes", 350000_i64, 60),
        ("Canvas Tote Bag", 2, "Everyday carry, reinforced straps", 120000_i64, 150),
    ];

    for (name, category_idx, description, price, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products
                (seller_id, category_id, name, slug, description, price_current, stock, image1)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(seller_id)
        .bind(category_ids[category_idx])
        .bind(name)
        .bind(slugs::slugify(name))
        .bind(description)
        .bind(price)
        .bind(stock)
        .bind(format!(
            "https://img.example.com/products/{}.png",
            slugs::slugify(name)
        ))
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
