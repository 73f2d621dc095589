use axum::http::StatusCode;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{CartLineResponse, CartUpdateRequest, ProductSnapshot},
    entity::{
        order_items::{
            ActiveModel as LineActive, Column as LineCol, Entity as OrderItems, Model as LineModel,
        },
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::catalog_service,
    state::AppState,
};

fn cart_filter(user: &AuthUser) -> Condition {
    Condition::all()
        .add(LineCol::UserId.eq(user.user_id))
        .add(LineCol::OrderId.is_null())
}

fn line_response(line: LineModel, product: ProductSnapshot) -> CartLineResponse {
    CartLineResponse {
        id: line.id,
        quantity: line.quantity,
        total: product.price * i64::from(line.quantity),
        product,
        created_at: line.created_at.with_timezone(&Utc),
    }
}

pub async fn list_cart(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<CartLineResponse>>> {
    let (page, per_page, offset) = pagination.normalize();
    let finder = OrderItems::find()
        .filter(cart_filter(user))
        .order_by_desc(LineCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let lines = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let snapshots = catalog_service::load_product_snapshots(&state.orm, &product_ids).await?;

    let items: Vec<CartLineResponse> = lines
        .into_iter()
        .filter_map(|line| {
            let product = snapshots.get(&line.product_id).cloned()?;
            Some(line_response(line, product))
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        items,
        Some(Meta::new(page, per_page, total)),
    ))
}

/// One endpoint covers add, update and remove: the quantity decides.
/// Zero deletes the line (or quietly does nothing when there is none).
pub async fn toggle_cart_item(
    state: &AppState,
    user: &AuthUser,
    payload: CartUpdateRequest,
) -> AppResult<(StatusCode, ApiResponse<CartLineResponse>)> {
    if payload.quantity < 0 {
        return Err(AppError::BadRequest("Quantity cannot be negative".into()));
    }

    let product = Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::Slug.eq(payload.slug.as_str()))
                .add(ProdCol::IsDeleted.eq(false)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("No Product with that slug"))?;

    let existing = OrderItems::find()
        .filter(cart_filter(user).add(LineCol::ProductId.eq(product.id)))
        .one(&state.orm)
        .await?;

    if payload.quantity == 0 {
        if let Some(line) = existing {
            OrderItems::delete_by_id(line.id).exec(&state.orm).await?;
            audit::record(
                &state.pool,
                user.user_id,
                "cart_remove",
                "order_items",
                serde_json::json!({ "product_id": product.id }),
            )
            .await;
        }
        return Ok((
            StatusCode::OK,
            ApiResponse::message_only("Item Removed From Cart"),
        ));
    }

    let (status, message, line) = match existing {
        Some(line) => {
            let mut active: LineActive = line.into();
            active.quantity = Set(payload.quantity);
            active.updated_at = Set(Utc::now().into());
            (
                StatusCode::OK,
                "Item Updated In Cart",
                active.update(&state.orm).await?,
            )
        }
        None => {
            let active = LineActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                product_id: Set(product.id),
                order_id: Set(None),
                quantity: Set(payload.quantity),
                created_at: NotSet,
                updated_at: NotSet,
            };
            (
                StatusCode::CREATED,
                "Item Added To Cart",
                active.insert(&state.orm).await?,
            )
        }
    };

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "order_items",
        serde_json::json!({ "product_id": product.id, "quantity": payload.quantity }),
    )
    .await;

    let snapshots = catalog_service::load_product_snapshots(&state.orm, &[product.id]).await?;
    let snapshot = snapshots
        .get(&product.id)
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("product snapshot missing")))?;

    Ok((
        status,
        ApiResponse::success(message, line_response(line, snapshot), None),
    ))
}
