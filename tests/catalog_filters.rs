use axum_marketplace_api::{
    db::create_pool,
    dto::{
        auth::RegisterRequest,
        products::{CategoryRequest, ProductCreateRequest},
        sellers::SellerApplyRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{GROUP_ADMIN, GROUP_USER},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{admin_service, auth_service, catalog_service, seller_service},
    state::AppState,
};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

// Storefront filters: substring search, price bounds and sorting over the
// active catalog.
#[tokio::test]
async fn product_listing_filters_and_sorting() -> anyhow::Result<()> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let state = setup_state(&database_url).await?;

    let admin_id = register(&state, "admin@example.com").await?;
    sqlx::query("UPDATE users SET is_staff = TRUE WHERE id = $1")
        .bind(admin_id)
        .execute(&state.pool)
        .await?;
    let admin = AuthUser {
        user_id: admin_id,
        group: GROUP_ADMIN.into(),
        role: None,
    };

    let seller_id = register(&state, "seller@example.com").await?;
    let seller = AuthUser {
        user_id: seller_id,
        group: GROUP_USER.into(),
        role: Some("BUYER".into()),
    };
    seller_service::apply(
        &state,
        &seller,
        SellerApplyRequest {
            business_name: "Bright Home".into(),
            website_url: None,
        },
    )
    .await?;
    admin_service::set_seller_approval(&state, &admin, "bright-home", true).await?;

    catalog_service::create_category(
        &state,
        &admin,
        CategoryRequest {
            name: "Lighting".into(),
            image: "https://img.example.com/cat/lighting.png".into(),
        },
    )
    .await?;
    let duplicate = catalog_service::create_category(
        &state,
        &admin,
        CategoryRequest {
            name: "Lighting".into(),
            image: "https://img.example.com/cat/lighting.png".into(),
        },
    )
    .await;
    assert_eq!(duplicate.unwrap_err().to_string(), "Category already exists");

    let categories = catalog_service::list_categories(&state).await?;
    let categories = categories.data.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].slug, "lighting");

    for (name, price) in [
        ("Desk Lamp", 40000_i64),
        ("Floor Lamp", 120000),
        ("Ceiling Light", 250000),
        ("Lamp Shade", 15000),
    ] {
        seller_service::create_product(
            &state,
            &seller,
            ProductCreateRequest {
                name: name.into(),
                description: format!("{name} for the living room"),
                category_slug: "lighting".into(),
                price_current: price,
                stock: Some(10),
                image1: "https://img.example.com/p/1.png".into(),
                image2: None,
                image3: None,
            },
        )
        .await?;
    }

    let all = catalog_service::list_products(&state, ProductQuery::default()).await?;
    assert_eq!(all.meta.unwrap().total, Some(4));

    let lamps = catalog_service::list_products(
        &state,
        ProductQuery {
            q: Some("Lamp".into()),
            ..ProductQuery::default()
        },
    )
    .await?;
    assert_eq!(lamps.data.unwrap().len(), 3);

    let mid_range = catalog_service::list_products(
        &state,
        ProductQuery {
            min_price: Some("20000".into()),
            max_price: Some("150000".into()),
            ..ProductQuery::default()
        },
    )
    .await?;
    let mid_range = mid_range.data.unwrap();
    assert_eq!(mid_range.len(), 2);
    assert!(mid_range.iter().all(|p| (20000..=150000).contains(&p.price_current)));

    let bad_bounds = catalog_service::list_products(
        &state,
        ProductQuery {
            min_price: Some("cheap".into()),
            ..ProductQuery::default()
        },
    )
    .await;
    assert!(matches!(bad_bounds.unwrap_err(), AppError::BadRequest(_)));

    let inverted = catalog_service::list_products(
        &state,
        ProductQuery {
            min_price: Some("150000".into()),
            max_price: Some("20000".into()),
            ..ProductQuery::default()
        },
    )
    .await;
    assert_eq!(
        inverted.unwrap_err().to_string(),
        "Max price must be greater than min price"
    );

    let by_price = catalog_service::list_products(
        &state,
        ProductQuery {
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..ProductQuery::default()
        },
    )
    .await?;
    let prices: Vec<i64> = by_price.data.unwrap().iter().map(|p| p.price_current).collect();
    assert_eq!(prices, vec![15000, 40000, 120000, 250000]);

    let paged = catalog_service::list_products(
        &state,
        ProductQuery {
            page: Some(2),
            per_page: Some(3),
            ..ProductQuery::default()
        },
    )
    .await?;
    assert_eq!(paged.data.unwrap().len(), 1);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url, 5).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(pool);

    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_string(
            backend,
            "TRUNCATE TABLE audit_logs, reviews, order_items, orders, shipping_addresses, products, categories, sellers, users RESTART IDENTITY CASCADE",
        ))
        .await?;

    Ok(state)
}

async fn register(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let resp = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            email: email.into(),
            password: "password123".into(),
            first_name: None,
            last_name: None,
        },
    )
    .await?;
    Ok(resp.data.unwrap().id)
}
