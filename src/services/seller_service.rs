use std::collections::HashSet;

use axum::http::StatusCode;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::orders::{OrderDetailResponse, OrderItemDetail, OrderSummaryResponse, ShippingSnapshot},
    dto::products::{ProductCreateRequest, ProductResponse, ProductUpdateRequest},
    dto::sellers::{SellerApplyRequest, SellerResponse},
    entity::{
        order_items::{Column as LineCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        products::{
            ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
            Model as ProductModel,
        },
        sellers::{ActiveModel as SellerActive, Column as SellerCol, Entity as Sellers, Model as SellerModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::ACCOUNT_TYPE_SELLER,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{catalog_service, order_service},
    slugs,
    state::AppState,
};

/// Every seller-scoped operation goes through this gate. An unapproved
/// seller and a plain buyer get the same answer.
pub async fn require_approved_seller(orm: &OrmConn, user: &AuthUser) -> AppResult<SellerModel> {
    Sellers::find()
        .filter(
            Condition::all()
                .add(SellerCol::UserId.eq(user.user_id))
                .add(SellerCol::IsApproved.eq(true)),
        )
        .one(orm)
        .await?
        .ok_or(AppError::Forbidden)
}

/// Apply to sell, or refresh an earlier application. Approval is admin-only
/// and survives re-application untouched.
pub async fn apply(
    state: &AppState,
    user: &AuthUser,
    payload: SellerApplyRequest,
) -> AppResult<(StatusCode, ApiResponse<SellerResponse>)> {
    let business_name = payload.business_name.trim().to_string();
    if business_name.is_empty() {
        return Err(AppError::BadRequest("Business name is required".into()));
    }

    let existing = Sellers::find()
        .filter(SellerCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;

    let orm = &state.orm;
    let current_id = existing.as_ref().map(|s| s.id);
    let slug = slugs::unique_slug(&business_name, |candidate| async move {
        let mut condition = Condition::all().add(SellerCol::Slug.eq(candidate));
        if let Some(id) = current_id {
            condition = condition.add(SellerCol::Id.ne(id));
        }
        let n = Sellers::find().filter(condition).count(orm).await?;
        Ok(n > 0)
    })
    .await?;

    let (status, message, row) = match existing {
        Some(row) => {
            let mut active: SellerActive = row.into();
            active.business_name = Set(business_name);
            active.slug = Set(slug);
            if payload.website_url.is_some() {
                active.website_url = Set(payload.website_url);
            }
            active.updated_at = Set(Utc::now().into());
            (
                StatusCode::OK,
                "Seller application updated",
                active.update(&state.orm).await?,
            )
        }
        None => {
            let active = SellerActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                business_name: Set(business_name),
                slug: Set(slug),
                website_url: Set(payload.website_url),
                is_approved: Set(false),
                created_at: NotSet,
                updated_at: NotSet,
            };
            (
                StatusCode::CREATED,
                "Seller application submitted",
                active.insert(&state.orm).await?,
            )
        }
    };

    Users::update_many()
        .col_expr(UserCol::AccountType, Expr::value(ACCOUNT_TYPE_SELLER))
        .col_expr(UserCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(UserCol::Id.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "seller_apply",
        "sellers",
        serde_json::json!({ "seller_id": row.id }),
    )
    .await;

    Ok((status, ApiResponse::success(message, row.into(), None)))
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<ProductResponse>>> {
    let seller = require_approved_seller(&state.orm, user).await?;
    let (page, per_page, offset) = pagination.normalize();

    let finder = Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::SellerId.eq(seller.id))
                .add(ProdCol::IsDeleted.eq(false)),
        )
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items: Vec<ProductResponse> = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        items,
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductCreateRequest,
) -> AppResult<ApiResponse<ProductResponse>> {
    let seller = require_approved_seller(&state.orm, user).await?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Product name is required".into()));
    }
    if payload.price_current < 0 {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }
    let stock = payload.stock.unwrap_or(5);
    if stock < 0 {
        return Err(AppError::BadRequest("Stock cannot be negative".into()));
    }

    // The category must resolve before anything is written.
    let category = catalog_service::find_category_by_slug(&state.orm, &payload.category_slug).await?;

    let slug = product_slug(&state.orm, &name, None).await?;

    let row = ProductActive {
        id: Set(Uuid::new_v4()),
        seller_id: Set(Some(seller.id)),
        category_id: Set(category.id),
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description),
        price_old: Set(None),
        price_current: Set(payload.price_current),
        stock: Set(stock),
        image1: Set(payload.image1),
        image2: Set(payload.image2),
        image3: Set(payload.image3),
        is_deleted: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": row.id }),
    )
    .await;

    Ok(ApiResponse::success("Product created", row.into(), None))
}

async fn find_own_product(
    orm: &OrmConn,
    seller: &SellerModel,
    slug: &str,
) -> AppResult<ProductModel> {
    Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::Slug.eq(slug))
                .add(ProdCol::SellerId.eq(seller.id))
                .add(ProdCol::IsDeleted.eq(false)),
        )
        .one(orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product does not exist!"))
}

async fn product_slug(orm: &OrmConn, name: &str, exclude: Option<Uuid>) -> AppResult<String> {
    slugs::unique_slug(name, |candidate| async move {
        let mut condition = Condition::all().add(ProdCol::Slug.eq(candidate));
        if let Some(id) = exclude {
            condition = condition.add(ProdCol::Id.ne(id));
        }
        let n = Products::find().filter(condition).count(orm).await?;
        Ok(n > 0)
    })
    .await
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    payload: ProductUpdateRequest,
) -> AppResult<ApiResponse<ProductResponse>> {
    let seller = require_approved_seller(&state.orm, user).await?;
    let product = find_own_product(&state.orm, &seller, slug).await?;

    let mut active: ProductActive = product.clone().into();

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Product name is required".into()));
        }
        if name != product.name {
            // Renaming moves the product to a fresh slug.
            active.slug = Set(product_slug(&state.orm, &name, Some(product.id)).await?);
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category_slug) = payload.category_slug {
        let category = catalog_service::find_category_by_slug(&state.orm, &category_slug).await?;
        active.category_id = Set(category.id);
    }
    if let Some(price) = payload.price_current {
        if price < 0 {
            return Err(AppError::BadRequest("Price cannot be negative".into()));
        }
        if price != product.price_current {
            // The outgoing price sticks around as the strike-through value.
            active.price_old = Set(Some(product.price_current));
            active.price_current = Set(price);
        }
    }
    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(AppError::BadRequest("Stock cannot be negative".into()));
        }
        active.stock = Set(stock);
    }
    if let Some(image1) = payload.image1 {
        active.image1 = Set(image1);
    }
    if payload.image2.is_some() {
        active.image2 = Set(payload.image2);
    }
    if payload.image3.is_some() {
        active.image3 = Set(payload.image3);
    }
    active.updated_at = Set(Utc::now().into());

    let row = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": row.id }),
    )
    .await;

    Ok(ApiResponse::success("Product updated", row.into(), None))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let seller = require_approved_seller(&state.orm, user).await?;
    let product = find_own_product(&state.orm, &seller, slug).await?;

    let mut active: ProductActive = product.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(Utc::now().into());
    let row = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": row.id }),
    )
    .await;

    Ok(ApiResponse::message_only("Product Deleted"))
}

/// Every product this seller ever listed, soft-deleted ones included; order
/// history must keep matching lines for products that are gone from the
/// storefront.
async fn all_product_ids(orm: &OrmConn, seller_id: Uuid) -> AppResult<Vec<Uuid>> {
    Ok(Products::find()
        .filter(ProdCol::SellerId.eq(seller_id))
        .all(orm)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect())
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<OrderSummaryResponse>>> {
    let seller = require_approved_seller(&state.orm, user).await?;
    let (page, per_page, offset) = pagination.normalize();

    let product_ids = all_product_ids(&state.orm, seller.id).await?;
    if product_ids.is_empty() {
        return Ok(ApiResponse::success(
            "OK",
            Vec::new(),
            Some(Meta::new(page, per_page, 0)),
        ));
    }

    let lines = OrderItems::find()
        .filter(
            Condition::all()
                .add(LineCol::ProductId.is_in(product_ids))
                .add(LineCol::OrderId.is_not_null()),
        )
        .all(&state.orm)
        .await?;

    let order_ids: HashSet<Uuid> = lines.iter().filter_map(|l| l.order_id).collect();

    let finder = Orders::find()
        .filter(OrderCol::Id.is_in(order_ids))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = order_service::summarize_orders(&state.orm, orders).await?;
    Ok(ApiResponse::success(
        "OK",
        items,
        Some(Meta::new(page, per_page, total)),
    ))
}

/// One order through a seller's eyes: only their own lines, totals over that
/// slice alone.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    tx_ref: &str,
) -> AppResult<ApiResponse<OrderDetailResponse>> {
    let seller = require_approved_seller(&state.orm, user).await?;

    let order = Orders::find()
        .filter(OrderCol::TxRef.eq(tx_ref))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order does not exist!"))?;

    let product_ids = all_product_ids(&state.orm, seller.id).await?;
    let lines = OrderItems::find()
        .filter(
            Condition::all()
                .add(LineCol::OrderId.eq(order.id))
                .add(LineCol::ProductId.is_in(product_ids)),
        )
        .all(&state.orm)
        .await?;
    if lines.is_empty() {
        return Err(AppError::not_found("Order does not exist!"));
    }

    let buyer = Users::find_by_id(order.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order owner missing")))?;

    let snapshot_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let snapshots = catalog_service::load_product_snapshots(&state.orm, &snapshot_ids).await?;

    let mut items = Vec::with_capacity(lines.len());
    let mut subtotal: i64 = 0;
    for line in lines {
        let Some(product) = snapshots.get(&line.product_id).cloned() else {
            continue;
        };
        let total = product.price * i64::from(line.quantity);
        subtotal += total;
        items.push(OrderItemDetail {
            id: line.id,
            quantity: line.quantity,
            price: product.price,
            total,
            product,
        });
    }

    let shipping_details = ShippingSnapshot::from(&order);
    let detail = OrderDetailResponse {
        tx_ref: order.tx_ref,
        first_name: buyer.first_name,
        last_name: buyer.last_name,
        email: buyer.email,
        delivery_status: order.delivery_status,
        payment_status: order.payment_status,
        shipping_details,
        items,
        subtotal,
        total: subtotal,
        created_at: order.created_at.with_timezone(&Utc),
    };

    Ok(ApiResponse::success("OK", detail, None))
}
