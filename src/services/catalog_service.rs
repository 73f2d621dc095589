use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::cart::ProductSnapshot,
    dto::products::{
        CategoryProductsResponse, CategoryRequest, CategoryResponse, ProductDetailResponse,
        ProductResponse,
    },
    dto::sellers::SellerBrief,
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        sellers::{Column as SellerCol, Entity as Sellers},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    slugs,
    state::AppState,
};

/// Public reads only ever see live rows.
pub async fn find_active_product_by_slug(orm: &OrmConn, slug: &str) -> AppResult<ProductModel> {
    Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::Slug.eq(slug))
                .add(ProdCol::IsDeleted.eq(false)),
        )
        .one(orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product does not exist!"))
}

pub async fn find_category_by_slug(orm: &OrmConn, slug: &str) -> AppResult<CategoryModel> {
    Categories::find()
        .filter(CategoryCol::Slug.eq(slug))
        .one(orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category does not exist!"))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let items: Vec<CategoryResponse> = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();
    Ok(ApiResponse::success("OK", items, None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<CategoryResponse>> {
    ensure_staff(user)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Category name is required".into()));
    }

    let duplicate = Categories::find()
        .filter(CategoryCol::Name.eq(name.clone()))
        .one(&state.orm)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::BadRequest("Category already exists".into()));
    }

    let orm = &state.orm;
    let slug = slugs::unique_slug(&name, |candidate| async move {
        let n = Categories::find()
            .filter(CategoryCol::Slug.eq(candidate))
            .count(orm)
            .await?;
        Ok(n > 0)
    })
    .await?;

    let row = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        image: Set(payload.image),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": row.id }),
    )
    .await;

    Ok(ApiResponse::success("Category created", row.into(), None))
}

pub async fn products_by_category(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<CategoryProductsResponse>> {
    let category = find_category_by_slug(&state.orm, slug).await?;

    let products: Vec<ProductResponse> = Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::CategoryId.eq(category.id))
                .add(ProdCol::IsDeleted.eq(false)),
        )
        .order_by_desc(ProdCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        CategoryProductsResponse {
            category: category.into(),
            products,
        },
        None,
    ))
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<Vec<ProductResponse>>> {
    let (min_price, max_price) = query.price_bounds()?;
    let (page, per_page, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(ProdCol::IsDeleted.eq(false));
    if let Some(min) = min_price {
        condition = condition.add(ProdCol::PriceCurrent.gte(min));
    }
    if let Some(max) = max_price {
        condition = condition.add(ProdCol::PriceCurrent.lte(max));
    }
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(ProdCol::Name.contains(q))
                .add(ProdCol::Description.contains(q)),
        );
    }

    let column = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => ProdCol::CreatedAt,
        ProductSortBy::Price => ProdCol::PriceCurrent,
        ProductSortBy::Name => ProdCol::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(column),
        SortOrder::Desc => finder.order_by_desc(column),
    };

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

/// Storefront listing: only approved sellers have one.
pub async fn products_by_seller(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<Vec<ProductResponse>>> {
    let seller = Sellers::find()
        .filter(
            Condition::all()
                .add(SellerCol::Slug.eq(slug))
                .add(SellerCol::IsApproved.eq(true)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Seller does not exist!"))?;

    let items: Vec<ProductResponse> = Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::SellerId.eq(seller.id))
                .add(ProdCol::IsDeleted.eq(false)),
        )
        .order_by_desc(ProdCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(ApiResponse::success("OK", items, None))
}

pub async fn product_detail(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetailResponse>> {
    let product = find_active_product_by_slug(&state.orm, slug).await?;

    let category = Categories::find_by_id(product.category_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category does not exist!"))?;

    let seller = match product.seller_id {
        Some(seller_id) => {
            let briefs = seller_briefs(&state.orm, &[seller_id]).await?;
            briefs.get(&seller_id).cloned()
        }
        None => None,
    };

    Ok(ApiResponse::success(
        "OK",
        ProductDetailResponse {
            product: product.into(),
            category: category.into(),
            seller,
        },
        None,
    ))
}

/// Batched storefront identities, keyed by seller id. Two fetches regardless
/// of input size: sellers, then their users for the avatar.
pub async fn seller_briefs(
    orm: &OrmConn,
    seller_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, SellerBrief>> {
    if seller_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sellers = Sellers::find()
        .filter(SellerCol::Id.is_in(seller_ids.iter().copied()))
        .all(orm)
        .await?;

    let user_ids: Vec<Uuid> = sellers.iter().map(|s| s.user_id).collect();
    let avatars: HashMap<Uuid, Option<String>> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u.avatar))
        .collect();

    Ok(sellers
        .into_iter()
        .map(|s| {
            let avatar = avatars.get(&s.user_id).cloned().flatten();
            (
                s.id,
                SellerBrief {
                    business_name: s.business_name,
                    slug: s.slug,
                    avatar,
                },
            )
        })
        .collect())
}

/// Line-item snapshots for cart and order rendering, keyed by product id.
/// Looks past the soft-delete flag: an order keeps showing what was bought.
pub async fn load_product_snapshots(
    orm: &OrmConn,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, ProductSnapshot>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let products = Products::find()
        .filter(ProdCol::Id.is_in(product_ids.iter().copied()))
        .all(orm)
        .await?;

    let seller_ids: Vec<Uuid> = products.iter().filter_map(|p| p.seller_id).collect();
    let briefs = seller_briefs(orm, &seller_ids).await?;

    Ok(products
        .into_iter()
        .map(|p| {
            let seller = p.seller_id.and_then(|id| briefs.get(&id).cloned());
            (
                p.id,
                ProductSnapshot {
                    name: p.name,
                    slug: p.slug,
                    price: p.price_current,
                    image: p.image1,
                    seller,
                },
            )
        })
        .collect())
}
