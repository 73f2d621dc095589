use axum::http::StatusCode;
use axum_marketplace_api::{
    db::create_pool,
    dto::{
        auth::{LoginRequest, RefreshRequest, RegisterRequest},
        cart::CartUpdateRequest,
        orders::CheckoutRequest,
        products::{CategoryRequest, ProductCreateRequest, ProductUpdateRequest},
        profile::{ShippingAddressRequest, UpdateProfileRequest},
        reviews::ReviewRequest,
        sellers::SellerApplyRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{GROUP_ADMIN, GROUP_USER},
    routes::params::{OrderListQuery, Pagination, ReviewQuery, SellerListQuery},
    services::{
        admin_service, auth_service, cart_service, catalog_service, order_service,
        profile_service, review_service, seller_service,
    },
    state::AppState,
};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

// Full journey: registration -> seller approval -> catalog -> cart ->
// checkout -> order views -> reviews -> admin status updates.
#[tokio::test]
async fn marketplace_end_to_end_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
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
    if std::env::var("JWT_SECRET").is_err() {
        unsafe { std::env::set_var("JWT_SECRET", "integration-test-secret") };
    }

    let state = setup_state(&database_url).await?;

    // Accounts
    let buyer_resp = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            email: "buyer@example.com".into(),
            password: "buyerpass123".into(),
            first_name: Some("Betty".into()),
            last_name: Some("Buyer".into()),
        },
    )
    .await?;
    assert_eq!(buyer_resp.message, "User created");
    let buyer_id = buyer_resp.data.unwrap().id;

    let dup = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            email: "buyer@example.com".into(),
            password: "buyerpass123".into(),
            first_name: None,
            last_name: None,
        },
    )
    .await;
    assert_eq!(dup.unwrap_err().to_string(), "Email is already taken");

    let seller_user_id = register_quick(&state, "seller@example.com").await?;
    let other_user_id = register_quick(&state, "other@example.com").await?;
    let rival_user_id = register_quick(&state, "rival@example.com").await?;
    let admin_id = register_quick(&state, "admin@example.com").await?;
    sqlx::query("UPDATE users SET is_staff = TRUE WHERE id = $1")
        .bind(admin_id)
        .execute(&state.pool)
        .await?;

    let tokens = auth_service::obtain_token_pair(
        &state.pool,
        LoginRequest {
            email: "buyer@example.com".into(),
            password: "buyerpass123".into(),
        },
    )
    .await?;
    let pair = tokens.data.unwrap();
    let refreshed = auth_service::refresh_access_token(
        &state.pool,
        RefreshRequest {
            refresh: pair.refresh,
        },
    )
    .await?;
    assert!(!refreshed.data.unwrap().access.is_empty());
    // An access token is not accepted where a refresh token is required.
    let not_refresh = auth_service::refresh_access_token(
        &state.pool,
        RefreshRequest { refresh: pair.access },
    )
    .await;
    assert!(matches!(not_refresh.unwrap_err(), AppError::Unauthorized(_)));

    let buyer = user_auth(buyer_id);
    let seller_user = user_auth(seller_user_id);
    let other_user = user_auth(other_user_id);
    let rival_user = user_auth(rival_user_id);
    let admin = admin_auth(admin_id);

    // Profile read and partial update
    let me = profile_service::get_profile(&state, &buyer).await?;
    assert_eq!(me.data.unwrap().email, "buyer@example.com");
    let me = profile_service::update_profile(
        &state,
        &buyer,
        UpdateProfileRequest {
            first_name: Some("Bette".into()),
            last_name: None,
            avatar: Some("https://img.example.com/avatars/betty.png".into()),
        },
    )
    .await?;
    let me = me.data.unwrap();
    assert_eq!(me.first_name.as_deref(), Some("Bette"));
    assert_eq!(me.last_name.as_deref(), Some("Buyer"));

    // Seller application: create then update, approval untouched.
    let (status, apply_resp) = seller_service::apply(
        &state,
        &seller_user,
        SellerApplyRequest {
            business_name: "Gad Gets".into(),
            website_url: None,
        },
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let seller_row = apply_resp.data.unwrap();
    assert_eq!(seller_row.slug, "gad-gets");
    assert!(!seller_row.is_approved);

    let (status, apply_resp) = seller_service::apply(
        &state,
        &seller_user,
        SellerApplyRequest {
            business_name: "Gadget Grove".into(),
            website_url: Some("https://gadgetgrove.example.com".into()),
        },
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let seller_row = apply_resp.data.unwrap();
    assert_eq!(seller_row.slug, "gadget-grove");
    assert!(!seller_row.is_approved);

    // Unapproved sellers are locked out of the seller surface.
    let denied = seller_service::list_products(&state, &seller_user, Pagination::default()).await;
    assert!(matches!(denied.unwrap_err(), AppError::Forbidden));

    let pending = admin_service::list_sellers(
        &state,
        &admin,
        SellerListQuery {
            approved: Some(false),
            ..SellerListQuery::default()
        },
    )
    .await?;
    assert_eq!(pending.data.unwrap().len(), 1);

    admin_service::set_seller_approval(&state, &admin, "gadget-grove", true).await?;

    // Categories: staff-only writes.
    let denied = catalog_service::create_category(
        &state,
        &buyer,
        CategoryRequest {
            name: "Gadgets".into(),
            image: "https://img.example.com/cat/gadgets.png".into(),
        },
    )
    .await;
    assert!(matches!(denied.unwrap_err(), AppError::Forbidden));

    let category = catalog_service::create_category(
        &state,
        &admin,
        CategoryRequest {
            name: "Gadgets".into(),
            image: "https://img.example.com/cat/gadgets.png".into(),
        },
    )
    .await?;
    assert_eq!(category.data.unwrap().slug, "gadgets");

    // Products
    let missing_category = seller_service::create_product(
        &state,
        &seller_user,
        product_request("Wireless Earbuds", "nope", 150000),
    )
    .await;
    assert_eq!(
        missing_category.unwrap_err().to_string(),
        "Category does not exist!"
    );

    let earbuds = seller_service::create_product(
        &state,
        &seller_user,
        product_request("Wireless Earbuds", "gadgets", 150000),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(earbuds.slug, "wireless-earbuds");
    assert_eq!(earbuds.stock, 5);
    assert_eq!(earbuds.price_old, None);

    let keyboard = seller_service::create_product(
        &state,
        &seller_user,
        product_request("Mechanical Keyboard", "gadgets", 450000),
    )
    .await?
    .data
    .unwrap();

    // A price change archives the previous price.
    let updated = seller_service::update_product(
        &state,
        &seller_user,
        "wireless-earbuds",
        ProductUpdateRequest {
            price_current: Some(120000),
            ..ProductUpdateRequest::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.price_current, 120000);
    assert_eq!(updated.price_old, Some(150000));

    // Renaming moves the slug.
    let renamed = seller_service::update_product(
        &state,
        &seller_user,
        "wireless-earbuds",
        ProductUpdateRequest {
            name: Some("Wireless Earbuds Pro".into()),
            ..ProductUpdateRequest::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(renamed.slug, "wireless-earbuds-pro");

    let foreign = seller_service::update_product(
        &state,
        &rival_user,
        "wireless-earbuds-pro",
        ProductUpdateRequest::default(),
    )
    .await;
    assert!(matches!(foreign.unwrap_err(), AppError::Forbidden));

    // Storefront reads
    let detail = catalog_service::product_detail(&state, "wireless-earbuds-pro").await?;
    let detail = detail.data.unwrap();
    assert_eq!(detail.category.slug, "gadgets");
    assert_eq!(detail.seller.unwrap().slug, "gadget-grove");

    let by_seller = catalog_service::products_by_seller(&state, "gadget-grove").await?;
    assert_eq!(by_seller.data.unwrap().len(), 2);

    let by_category = catalog_service::products_by_category(&state, "gadgets").await?;
    assert_eq!(by_category.data.unwrap().products.len(), 2);

    // Soft delete hides a product from every public read.
    seller_service::create_product(
        &state,
        &seller_user,
        product_request("Retired Gizmo", "gadgets", 90000),
    )
    .await?;
    seller_service::delete_product(&state, &seller_user, "retired-gizmo").await?;
    let gone = catalog_service::product_detail(&state, "retired-gizmo").await;
    assert_eq!(gone.unwrap_err().to_string(), "Product does not exist!");
    let by_seller = catalog_service::products_by_seller(&state, "gadget-grove").await?;
    assert_eq!(by_seller.data.unwrap().len(), 2);

    // A second product with a taken name lands on a suffixed slug.
    let twin = seller_service::create_product(
        &state,
        &seller_user,
        product_request("Mechanical Keyboard", "gadgets", 480000),
    )
    .await?
    .data
    .unwrap();
    assert_ne!(twin.slug, keyboard.slug);
    assert!(twin.slug.starts_with("mechanical-keyboard-"));

    // Cart: add, overwrite, remove.
    let (status, added) = cart_service::toggle_cart_item(
        &state,
        &buyer,
        CartUpdateRequest {
            slug: "wireless-earbuds-pro".into(),
            quantity: 2,
        },
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added.message, "Item Added To Cart");
    assert_eq!(added.data.unwrap().total, 240000);

    let (status, updated) = cart_service::toggle_cart_item(
        &state,
        &buyer,
        CartUpdateRequest {
            slug: "wireless-earbuds-pro".into(),
            quantity: 3,
        },
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated.message, "Item Updated In Cart");
    assert_eq!(updated.data.unwrap().quantity, 3);

    let cart = cart_service::list_cart(&state, &buyer, Pagination::default()).await?;
    assert_eq!(cart.meta.unwrap().total, Some(1));

    let (status, removed) = cart_service::toggle_cart_item(
        &state,
        &buyer,
        CartUpdateRequest {
            slug: "wireless-earbuds-pro".into(),
            quantity: 0,
        },
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed.message, "Item Removed From Cart");
    assert!(removed.data.is_none());

    // Checkout
    let empty = order_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            shipping_id: Uuid::new_v4(),
        },
    )
    .await;
    assert!(matches!(empty.unwrap_err(), AppError::EmptyCart));

    cart_service::toggle_cart_item(
        &state,
        &buyer,
        CartUpdateRequest {
            slug: "mechanical-keyboard".into(),
            quantity: 2,
        },
    )
    .await?;

    let bad_address = order_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            shipping_id: Uuid::new_v4(),
        },
    )
    .await;
    assert_eq!(
        bad_address.unwrap_err().to_string(),
        "No shipping address with that ID"
    );

    let address = profile_service::create_address(
        &state,
        &buyer,
        ShippingAddressRequest {
            full_name: "Betty Buyer".into(),
            email: "buyer@example.com".into(),
            phone: "+15550100".into(),
            address: "1 Main St".into(),
            city: "Springfield".into(),
            country: "USA".into(),
            zipcode: "12345".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let checkout = order_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            shipping_id: address.id,
        },
    )
    .await?;
    assert_eq!(checkout.message, "Checkout Successful");
    let order = checkout.data.unwrap();
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.subtotal, 900000);
    assert_eq!(order.total, 900000);
    assert_eq!(order.delivery_status, "PENDING");
    assert_eq!(order.payment_status, "PENDING");
    assert_eq!(order.shipping_details.city, "Springfield");
    let tx_ref = order.tx_ref.clone();

    // Checkout emptied the cart.
    let cart = cart_service::list_cart(&state, &buyer, Pagination::default()).await?;
    assert_eq!(cart.meta.unwrap().total, Some(0));

    // Order views
    let orders = profile_service::list_orders(&state, &buyer, Pagination::default()).await?;
    let orders = orders.data.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].tx_ref, tx_ref);
    assert_eq!(orders[0].total, 900000);

    let own = profile_service::get_order(&state, &buyer, &tx_ref).await?;
    assert_eq!(own.data.unwrap().email, "buyer@example.com");

    let foreign = profile_service::get_order(&state, &other_user, &tx_ref).await;
    assert_eq!(foreign.unwrap_err().to_string(), "Order does not exist!");
    // Staff can read anyone's order.
    profile_service::get_order(&state, &admin, &tx_ref).await?;

    // Editing the address afterwards leaves the order snapshot alone.
    profile_service::update_address(
        &state,
        &buyer,
        address.id,
        ShippingAddressRequest {
            full_name: "Betty Buyer".into(),
            email: "buyer@example.com".into(),
            phone: "+15550100".into(),
            address: "9 Oak Ave".into(),
            city: "Shelbyville".into(),
            country: "USA".into(),
            zipcode: "67890".into(),
        },
    )
    .await?;
    let own = profile_service::get_order(&state, &buyer, &tx_ref).await?;
    let own = own.data.unwrap();
    assert_eq!(own.shipping_details.city, "Springfield");
    assert_eq!(own.shipping_details.zipcode, "12345");

    let seller_orders =
        seller_service::list_orders(&state, &seller_user, Pagination::default()).await?;
    let seller_orders = seller_orders.data.unwrap();
    assert_eq!(seller_orders.len(), 1);
    assert_eq!(seller_orders[0].tx_ref, tx_ref);

    let seller_view = seller_service::get_order(&state, &seller_user, &tx_ref).await?;
    let seller_view = seller_view.data.unwrap();
    assert_eq!(seller_view.items.len(), 1);
    assert_eq!(seller_view.subtotal, 900000);

    // A seller with no line in the order sees nothing.
    seller_service::apply(
        &state,
        &rival_user,
        SellerApplyRequest {
            business_name: "Rival Wares".into(),
            website_url: None,
        },
    )
    .await?;
    admin_service::set_seller_approval(&state, &admin, "rival-wares", true).await?;
    let not_theirs = seller_service::get_order(&state, &rival_user, &tx_ref).await;
    assert_eq!(not_theirs.unwrap_err().to_string(), "Order does not exist!");

    // Order totals track the live product price.
    seller_service::update_product(
        &state,
        &seller_user,
        "mechanical-keyboard",
        ProductUpdateRequest {
            price_current: Some(500000),
            ..ProductUpdateRequest::default()
        },
    )
    .await?;
    let repriced = profile_service::get_order(&state, &buyer, &tx_ref).await?;
    assert_eq!(repriced.data.unwrap().total, 1000000);

    // Reviews
    let bad_rating = review_service::upsert(
        &state,
        &buyer,
        "mechanical-keyboard",
        ReviewRequest {
            rating: 6,
            text: "off the scale".into(),
        },
    )
    .await;
    assert!(matches!(bad_rating.unwrap_err(), AppError::BadRequest(_)));

    let (status, created) = review_service::upsert(
        &state,
        &buyer,
        "mechanical-keyboard",
        ReviewRequest {
            rating: 5,
            text: "Clacky perfection".into(),
        },
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.message, "Created Review");
    let first_review_id = created.data.unwrap().id;

    let (status, updated) = review_service::upsert(
        &state,
        &buyer,
        "mechanical-keyboard",
        ReviewRequest {
            rating: 3,
            text: "Keycaps wore out".into(),
        },
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated.message, "Updated Review");
    let updated = updated.data.unwrap();
    assert_eq!(updated.id, first_review_id);
    assert_eq!(updated.rating, 3);

    let own_seller = review_service::upsert(
        &state,
        &seller_user,
        "mechanical-keyboard",
        ReviewRequest {
            rating: 5,
            text: "I made this".into(),
        },
    )
    .await;
    assert!(matches!(own_seller.unwrap_err(), AppError::Forbidden));

    let mine =
        review_service::list(&state, &buyer, "mechanical-keyboard", ReviewQuery::default())
            .await?;
    assert_eq!(mine.data.unwrap().len(), 1);

    let (_, others) = review_service::upsert(
        &state,
        &other_user,
        "mechanical-keyboard",
        ReviewRequest {
            rating: 4,
            text: "Solid build".into(),
        },
    )
    .await?;
    let other_review_id = others.data.unwrap().id;

    let not_author = review_service::delete(
        &state,
        &buyer,
        "mechanical-keyboard",
        other_review_id,
    )
    .await;
    assert_eq!(not_author.unwrap_err().to_string(), "Review does not exist!");

    let staff_delete =
        review_service::delete(&state, &admin, "mechanical-keyboard", other_review_id).await?;
    assert_eq!(staff_delete.message, "Success delete review");

    review_service::delete(&state, &buyer, "mechanical-keyboard", first_review_id).await?;
    let mine =
        review_service::list(&state, &buyer, "mechanical-keyboard", ReviewQuery::default())
            .await?;
    assert!(mine.data.unwrap().is_empty());

    // Admin order management
    let invalid = admin_service::update_order_status(
        &state,
        &admin,
        &tx_ref,
        Some("TELEPORTED".into()),
        None,
    )
    .await;
    assert_eq!(invalid.unwrap_err().to_string(), "Invalid delivery status");

    let updated = admin_service::update_order_status(
        &state,
        &admin,
        &tx_ref,
        Some("shipping".into()),
        Some("successful".into()),
    )
    .await?;
    let updated = updated.data.unwrap();
    assert_eq!(updated.delivery_status, "SHIPPING");
    assert_eq!(updated.payment_status, "SUCCESSFUL");

    let shipping = admin_service::list_orders(
        &state,
        &admin,
        OrderListQuery {
            status: Some("SHIPPING".into()),
            ..OrderListQuery::default()
        },
    )
    .await?;
    assert_eq!(shipping.data.unwrap().len(), 1);

    let delivered = admin_service::list_orders(
        &state,
        &admin,
        OrderListQuery {
            status: Some("DELIVERED".into()),
            ..OrderListQuery::default()
        },
    )
    .await?;
    assert!(delivered.data.unwrap().is_empty());

    let non_staff =
        admin_service::list_orders(&state, &buyer, OrderListQuery::default()).await;
    assert!(matches!(non_staff.unwrap_err(), AppError::Forbidden));

    // Deactivation closes the account for future logins.
    let gone = profile_service::deactivate_profile(&state, &buyer).await?;
    assert_eq!(gone.message, "User Account Deactivated");
    let login = auth_service::obtain_token_pair(
        &state.pool,
        LoginRequest {
            email: "buyer@example.com".into(),
            password: "buyerpass123".into(),
        },
    )
    .await;
    assert_eq!(login.unwrap_err().to_string(), "Invalid email or password");

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url, 5).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(pool);

    // Clean tables between runs
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

async fn register_quick(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
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

fn product_request(name: &str, category_slug: &str, price_current: i64) -> ProductCreateRequest {
    ProductCreateRequest {
        name: name.into(),
        description: format!("{name} from the integration flow"),
        category_slug: category_slug.into(),
        price_current,
        stock: None,
        image1: "https://img.example.com/products/main.png".into(),
        image2: None,
        image3: None,
    }
}

fn user_auth(user_id: Uuid) -> AuthUser {
    AuthUser {
        user_id,
        group: GROUP_USER.into(),
        role: Some("BUYER".into()),
    }
}

fn admin_auth(user_id: Uuid) -> AuthUser {
    AuthUser {
        user_id,
        group: GROUP_ADMIN.into(),
        role: None,
    }
}
