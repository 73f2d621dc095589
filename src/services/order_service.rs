use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit, codes,
    db::OrmConn,
    dto::orders::{CheckoutRequest, OrderDetailResponse, OrderItemDetail, OrderSummaryResponse, ShippingSnapshot},
    entity::{
        order_items::{Column as LineCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        shipping_addresses::Entity as ShippingAddresses,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::catalog_service,
    state::AppState,
};

/// Turns the caller's cart into an order: snapshot the chosen address, mint a
/// reference, and reassign every cart line in one statement. All inside a
/// transaction so a failure leaves the cart untouched.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderDetailResponse>> {
    let txn = state.orm.begin().await?;

    let cart_lines = OrderItems::find()
        .filter(
            Condition::all()
                .add(LineCol::UserId.eq(user.user_id))
                .add(LineCol::OrderId.is_null()),
        )
        .all(&txn)
        .await?;
    if cart_lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    // Looked up by id alone; any address row will do as long as it exists.
    let shipping = ShippingAddresses::find_by_id(payload.shipping_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("No shipping address with that ID"))?;

    let txn_ref = &txn;
    let tx_ref = codes::generate_unique_code(|code| async move {
        let n = Orders::find()
            .filter(OrderCol::TxRef.eq(code))
            .count(txn_ref)
            .await?;
        Ok(n > 0)
    })
    .await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        tx_ref: Set(tx_ref),
        delivery_status: Set("PENDING".into()),
        payment_status: Set("PENDING".into()),
        full_name: Set(shipping.full_name),
        email: Set(shipping.email),
        phone: Set(shipping.phone),
        address: Set(shipping.address),
        city: Set(shipping.city),
        country: Set(shipping.country),
        zipcode: Set(shipping.zipcode),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    OrderItems::update_many()
        .col_expr(LineCol::OrderId, Expr::value(order.id))
        .filter(
            Condition::all()
                .add(LineCol::UserId.eq(user.user_id))
                .add(LineCol::OrderId.is_null()),
        )
        .exec(&txn)
        .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "tx_ref": order.tx_ref }),
    )
    .await;

    let detail = load_order_detail(&state.orm, order).await?;
    Ok(ApiResponse::success(
        "Checkout Successful",
        detail,
        Some(Meta::empty()),
    ))
}

/// Assembles the full order aggregate with explicit fetches: buyer, lines,
/// then product snapshots, joined in memory. Totals come from current
/// product prices, not from anything stored on the order.
pub async fn load_order_detail(
    orm: &OrmConn,
    order: OrderModel,
) -> AppResult<OrderDetailResponse> {
    let buyer = Users::find_by_id(order.user_id)
        .one(orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order owner missing")))?;

    let lines = OrderItems::find()
        .filter(LineCol::OrderId.eq(order.id))
        .all(orm)
        .await?;

    let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let snapshots = catalog_service::load_product_snapshots(orm, &product_ids).await?;

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
    Ok(OrderDetailResponse {
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
    })
}

/// List-sized aggregate: one fetch for all lines of the given orders, one for
/// their products, totals grouped per order in memory.
pub async fn summarize_orders(
    orm: &OrmConn,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderSummaryResponse>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let lines = OrderItems::find()
        .filter(LineCol::OrderId.is_in(order_ids))
        .all(orm)
        .await?;

    let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let snapshots = catalog_service::load_product_snapshots(orm, &product_ids).await?;

    let mut totals: HashMap<Uuid, i64> = HashMap::new();
    for line in &lines {
        let Some(order_id) = line.order_id else {
            continue;
        };
        let Some(product) = snapshots.get(&line.product_id) else {
            continue;
        };
        *totals.entry(order_id).or_insert(0) += product.price * i64::from(line.quantity);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let subtotal = totals.get(&order.id).copied().unwrap_or(0);
            OrderSummaryResponse {
                tx_ref: order.tx_ref,
                delivery_status: order.delivery_status,
                payment_status: order.payment_status,
                subtotal,
                total: subtotal,
                created_at: order.created_at.with_timezone(&Utc),
            }
        })
        .collect())
}
