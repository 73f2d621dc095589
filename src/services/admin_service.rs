use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    audit,
    dto::orders::{OrderDetailResponse, OrderSummaryResponse},
    dto::sellers::SellerResponse,
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        sellers::{ActiveModel as SellerActive, Column as SellerCol, Entity as Sellers},
    },
    error::{AppError, AppResult},
    middleware::auth::{ensure_staff, AuthUser},
    models::{DELIVERY_STATUSES, PAYMENT_STATUSES},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SellerListQuery, SortOrder},
    services::order_service,
    state::AppState,
};

pub async fn list_sellers(
    state: &AppState,
    user: &AuthUser,
    query: SellerListQuery,
) -> AppResult<ApiResponse<Vec<SellerResponse>>> {
    ensure_staff(user)?;
    let (page, per_page, offset) = query.pagination().normalize();

    let mut finder = Sellers::find().order_by_desc(SellerCol::CreatedAt);
    if let Some(approved) = query.approved {
        finder = finder.filter(SellerCol::IsApproved.eq(approved));
    }

    let total = finder.clone().count(&state.orm).await? as i64;
    let items: Vec<SellerResponse> = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(SellerResponse::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        items,
        Some(Meta::new(page, per_page, total)),
    ))
}

/// Grants or revokes the flag that opens the seller surface. Applying again
/// never touches it; this is the only way it changes.
pub async fn set_seller_approval(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    approve: bool,
) -> AppResult<ApiResponse<SellerResponse>> {
    ensure_staff(user)?;

    let seller = Sellers::find()
        .filter(SellerCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Seller does not exist!"))?;

    let mut active: SellerActive = seller.into();
    active.is_approved = Set(approve);
    active.updated_at = Set(Utc::now().into());
    let row = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "seller_approval",
        "sellers",
        serde_json::json!({ "seller_id": row.id, "approved": approve }),
    )
    .await;

    let message = if approve {
        "Seller approved"
    } else {
        "Seller approval revoked"
    };
    Ok(ApiResponse::success(message, row.into(), None))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<OrderSummaryResponse>>> {
    ensure_staff(user)?;
    let (page, per_page, offset) = query.pagination().normalize();

    let mut finder = Orders::find();
    if let Some(status) = query.status.as_deref() {
        let status = normalize_status(status, &DELIVERY_STATUSES, "Invalid delivery status")?;
        finder = finder.filter(OrderCol::DeliveryStatus.eq(status));
    }
    let finder = match query.sort_order {
        Some(SortOrder::Asc) => finder.order_by_asc(OrderCol::CreatedAt),
        _ => finder.order_by_desc(OrderCol::CreatedAt),
    };

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

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    tx_ref: &str,
    delivery_status: Option<String>,
    payment_status: Option<String>,
) -> AppResult<ApiResponse<OrderDetailResponse>> {
    ensure_staff(user)?;

    if delivery_status.is_none() && payment_status.is_none() {
        return Err(AppError::BadRequest("Nothing to update".into()));
    }

    let order = Orders::find()
        .filter(OrderCol::TxRef.eq(tx_ref))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order does not exist!"))?;

    let mut active: OrderActive = order.into();
    if let Some(status) = delivery_status.as_deref() {
        let status = normalize_status(status, &DELIVERY_STATUSES, "Invalid delivery status")?;
        active.delivery_status = Set(status);
    }
    if let Some(status) = payment_status.as_deref() {
        let status = normalize_status(status, &PAYMENT_STATUSES, "Invalid payment status")?;
        active.payment_status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());
    let row = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({
            "tx_ref": row.tx_ref,
            "delivery_status": row.delivery_status,
            "payment_status": row.payment_status,
        }),
    )
    .await;

    let detail = order_service::load_order_detail(&state.orm, row).await?;
    Ok(ApiResponse::success("Order status updated", detail, None))
}

fn normalize_status(raw: &str, allowed: &[&str], error: &str) -> AppResult<String> {
    let value = raw.trim().to_uppercase();
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(AppError::BadRequest(error.into()))
    }
}
