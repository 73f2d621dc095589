use axum::http::StatusCode;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::reviews::{ReviewRequest, ReviewResponse},
    entity::{
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
        sellers::{Column as SellerCol, Entity as Sellers},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{ReviewQuery, ReviewSortBy, SortOrder},
    state::AppState,
};

async fn find_reviewed_product(orm: &OrmConn, slug: &str) -> AppResult<ProductModel> {
    Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::Slug.eq(slug))
                .add(ProdCol::IsDeleted.eq(false)),
        )
        .one(orm)
        .await?
        .ok_or_else(|| AppError::not_found("No Product with that slug"))
}

/// The caller's live reviews of one product. Empty is an answer, not an
/// error.
pub async fn list(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    query: ReviewQuery,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    let product = find_reviewed_product(&state.orm, slug).await?;
    let (sort_by, sort_order) = query.order()?;

    let column = match sort_by {
        ReviewSortBy::CreatedAt => ReviewCol::CreatedAt,
        ReviewSortBy::Rating => ReviewCol::Rating,
    };
    let finder = Reviews::find().filter(
        Condition::all()
            .add(ReviewCol::UserId.eq(user.user_id))
            .add(ReviewCol::ProductId.eq(product.id))
            .add(ReviewCol::IsDeleted.eq(false)),
    );
    let finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(column),
        SortOrder::Desc => finder.order_by_desc(column),
    };

    let items: Vec<ReviewResponse> = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ReviewResponse::from)
        .collect();

    Ok(ApiResponse::success("OK", items, None))
}

/// One live review per buyer per product: a second submission rewrites the
/// first instead of adding a row.
pub async fn upsert(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    payload: ReviewRequest,
) -> AppResult<(StatusCode, ApiResponse<ReviewResponse>)> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 5".into()));
    }

    let product = find_reviewed_product(&state.orm, slug).await?;

    // Sellers cannot review their own listings; staff may.
    if !user.is_staff() {
        if let Some(seller) = Sellers::find()
            .filter(SellerCol::UserId.eq(user.user_id))
            .one(&state.orm)
            .await?
        {
            if product.seller_id == Some(seller.id) {
                return Err(AppError::Forbidden);
            }
        }
    }

    let existing = Reviews::find()
        .filter(
            Condition::all()
                .add(ReviewCol::UserId.eq(user.user_id))
                .add(ReviewCol::ProductId.eq(product.id))
                .add(ReviewCol::IsDeleted.eq(false)),
        )
        .one(&state.orm)
        .await?;

    let (status, message, action, row) = match existing {
        Some(row) => {
            let mut active: ReviewActive = row.into();
            active.rating = Set(payload.rating);
            active.text = Set(payload.text);
            active.updated_at = Set(Utc::now().into());
            (
                StatusCode::OK,
                "Updated Review",
                "review_update",
                active.update(&state.orm).await?,
            )
        }
        None => {
            let active = ReviewActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                product_id: Set(product.id),
                rating: Set(payload.rating),
                text: Set(payload.text),
                is_deleted: Set(false),
                created_at: NotSet,
                updated_at: NotSet,
            };
            (
                StatusCode::CREATED,
                "Created Review",
                "review_create",
                active.insert(&state.orm).await?,
            )
        }
    };

    audit::record(
        &state.pool,
        user.user_id,
        action,
        "reviews",
        serde_json::json!({ "review_id": row.id, "product_id": row.product_id }),
    )
    .await;

    Ok((status, ApiResponse::success(message, row.into(), None)))
}

/// Removes the row outright. The author and staff see the review; anyone
/// else gets the same 404 as a missing id.
pub async fn delete(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    review_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let product = find_reviewed_product(&state.orm, slug).await?;

    let review = Reviews::find()
        .filter(
            Condition::all()
                .add(ReviewCol::Id.eq(review_id))
                .add(ReviewCol::ProductId.eq(product.id)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Review does not exist!"))?;

    if review.user_id != user.user_id && !user.is_staff() {
        return Err(AppError::not_found("Review does not exist!"));
    }

    review.delete(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "review_delete",
        "reviews",
        serde_json::json!({ "review_id": review_id, "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::message_only("Success delete review"))
}
