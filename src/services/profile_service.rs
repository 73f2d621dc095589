use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::UserResponse,
    dto::orders::{OrderDetailResponse, OrderSummaryResponse},
    dto::profile::{ShippingAddressRequest, ShippingAddressResponse, UpdateProfileRequest},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        shipping_addresses::{
            ActiveModel as AddressActive, Column as AddressCol, Entity as ShippingAddresses,
            Model as AddressModel,
        },
        users::{ActiveModel as UserActive, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::order_service,
    state::AppState,
};

async fn find_own_user(state: &AppState, user: &AuthUser) -> AppResult<UserModel> {
    Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User does not exist!"))
}

pub async fn get_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UserResponse>> {
    let row = find_own_user(state, user).await?;
    Ok(ApiResponse::success("OK", row.into(), None))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    let row = find_own_user(state, user).await?;
    let mut active: UserActive = row.into();
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(Some(first_name));
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(Some(last_name));
    }
    if let Some(avatar) = payload.avatar {
        active.avatar = Set(Some(avatar));
    }
    active.updated_at = Set(Utc::now().into());
    let row = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "profile_update",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success("Profile updated", row.into(), None))
}

/// Accounts are never deleted, only switched off.
pub async fn deactivate_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let row = find_own_user(state, user).await?;
    let mut active: UserActive = row.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "account_deactivate",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::message_only("User Account Deactivated"))
}

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<ShippingAddressResponse>>> {
    let (page, per_page, offset) = pagination.normalize();
    let finder = ShippingAddresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .order_by_desc(AddressCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items: Vec<ShippingAddressResponse> = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ShippingAddressResponse::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        items,
        Some(Meta::new(page, per_page, total)),
    ))
}

/// Get-or-create keyed on the full field set, so resubmitting the same form
/// never piles up duplicate rows.
pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: ShippingAddressRequest,
) -> AppResult<ApiResponse<ShippingAddressResponse>> {
    let existing = ShippingAddresses::find()
        .filter(
            Condition::all()
                .add(AddressCol::UserId.eq(user.user_id))
                .add(AddressCol::FullName.eq(payload.full_name.clone()))
                .add(AddressCol::Email.eq(payload.email.clone()))
                .add(AddressCol::Phone.eq(payload.phone.clone()))
                .add(AddressCol::Address.eq(payload.address.clone()))
                .add(AddressCol::City.eq(payload.city.clone()))
                .add(AddressCol::Country.eq(payload.country.clone()))
                .add(AddressCol::Zipcode.eq(payload.zipcode.clone())),
        )
        .one(&state.orm)
        .await?;

    let row = match existing {
        Some(row) => row,
        None => {
            let row = AddressActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                full_name: Set(payload.full_name),
                email: Set(payload.email),
                phone: Set(payload.phone),
                address: Set(payload.address),
                city: Set(payload.city),
                country: Set(payload.country),
                zipcode: Set(payload.zipcode),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?;

            audit::record(
                &state.pool,
                user.user_id,
                "address_create",
                "shipping_addresses",
                serde_json::json!({ "address_id": row.id }),
            )
            .await;
            row
        }
    };

    Ok(ApiResponse::success("Shipping Address", row.into(), None))
}

async fn find_own_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<AddressModel> {
    ShippingAddresses::find()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(id))
                .add(AddressCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Shipping Address does not exist!"))
}

pub async fn get_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ShippingAddressResponse>> {
    let row = find_own_address(state, user, id).await?;
    Ok(ApiResponse::success("OK", row.into(), None))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ShippingAddressRequest,
) -> AppResult<ApiResponse<ShippingAddressResponse>> {
    let row = find_own_address(state, user, id).await?;
    let mut active: AddressActive = row.into();
    active.full_name = Set(payload.full_name);
    active.email = Set(payload.email);
    active.phone = Set(payload.phone);
    active.address = Set(payload.address);
    active.city = Set(payload.city);
    active.country = Set(payload.country);
    active.zipcode = Set(payload.zipcode);
    active.updated_at = Set(Utc::now().into());
    let row = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_update",
        "shipping_addresses",
        serde_json::json!({ "address_id": row.id }),
    )
    .await;

    Ok(ApiResponse::success("Shipping Address Updated", row.into(), None))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let row = find_own_address(state, user, id).await?;
    ShippingAddresses::delete_by_id(row.id)
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_delete",
        "shipping_addresses",
        serde_json::json!({ "address_id": row.id }),
    )
    .await;

    Ok(ApiResponse::message_only("Shipping Address Deleted"))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<OrderSummaryResponse>>> {
    let (page, per_page, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let rows = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = order_service::summarize_orders(&state.orm, rows).await?;
    Ok(ApiResponse::success(
        "OK",
        items,
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    tx_ref: &str,
) -> AppResult<ApiResponse<OrderDetailResponse>> {
    let order = Orders::find()
        .filter(OrderCol::TxRef.eq(tx_ref))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order does not exist!"))?;

    // Foreign orders read as missing, not forbidden.
    if order.user_id != user.user_id && !user.is_staff() {
        return Err(AppError::not_found("Order does not exist!"));
    }

    let detail = order_service::load_order_detail(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", detail, None))
}
