use std::str::FromStr;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        AdminOrderEntry, AdminOrderList, OrderDetail, OrderList, OrderUser, OrderWithItems,
        PlaceOrderRequest, UpdateOrderStatusRequest,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        users,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderItem, OrderStatus, ShippingAddress},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

const DEFAULT_PAYMENT_METHOD: &str = "Cash on Delivery";

/// Checkout: snapshot the session's cart into a new Pending order and clear
/// the cart, all inside one transaction. The total is recomputed from the
/// lines and the pricing policy; any client-sent total is a display hint.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.session_id.trim().is_empty() {
        return Err(AppError::BadRequest("session_id is required".into()));
    }

    let txn = state.orm.begin().await?;

    let lines = CartItems::find()
        .filter(CartCol::SessionId.eq(payload.session_id.as_str()))
        .order_by_asc(CartCol::CreatedAt)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if lines.is_empty() {
        return Err(AppError::BadRequest("No items in order".into()));
    }

    let subtotal: i64 = lines
        .iter()
        .map(|line| line.price * line.quantity as i64)
        .sum();
    let quote = state.pricing.quote(subtotal);

    if let Some(client_total) = payload.client_total {
        if client_total != quote.total {
            tracing::warn!(
                client_total,
                server_total = quote.total,
                session_id = %payload.session_id,
                "client total disagrees with server pricing"
            );
        }
    }

    let payment_method = payload
        .payment_method
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
    let address = payload.shipping_address;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        subtotal: Set(quote.subtotal),
        tax: Set(quote.tax),
        shipping_fee: Set(quote.shipping_fee),
        total_amount: Set(quote.total),
        status: Set(OrderStatus::Pending),
        payment_method: Set(payment_method),
        is_paid: Set(false),
        paid_at: Set(None),
        delivered_at: Set(None),
        ship_full_name: Set(address.full_name),
        ship_address: Set(address.address),
        ship_city: Set(address.city),
        ship_postal_code: Set(address.postal_code),
        ship_phone: Set(address.phone),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            name: Set(line.name.clone()),
            price: Set(line.price),
            quantity: Set(line.quantity),
            image: Set(line.image.clone()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    CartItems::delete_many()
        .filter(CartCol::SessionId.eq(payload.session_id.as_str()))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_place",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total_amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed successfully",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_mine(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = parse_status_filter(query.status.as_deref())? {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "OK",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn list_all(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<AdminOrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = parse_status_filter(query.status.as_deref())? {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .find_also_related(Users)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for (order, owner) in rows {
        items.push(AdminOrderEntry {
            order: order_from_entity(order),
            user: owner_info(owner)?,
        });
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        AdminOrderList { items },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let row = Orders::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?;
    let (order, owner) = match row {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    if order.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden);
    }

    let items = load_items(state, order.id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderDetail {
            order: order_from_entity(order),
            items,
            user: owner_info(owner)?,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<AdminOrderEntry>> {
    ensure_admin(user)?;
    let next = OrderStatus::from_str(&payload.status)
        .map_err(|_| AppError::BadRequest("Invalid status".into()))?;

    let txn = state.orm.begin().await?;

    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if !existing.status.can_transition(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot change status from {} to {}",
            existing.status, next
        )));
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    active.status = Set(next);
    active.updated_at = Set(now.into());
    // Delivery doubles as payment confirmation for cash on delivery.
    if next == OrderStatus::Delivered {
        active.is_paid = Set(true);
        active.paid_at = Set(Some(now.into()));
        active.delivered_at = Set(Some(now.into()));
    }
    let order = active.update(&txn).await?;

    txn.commit().await?;

    let owner = Users::find_by_id(order.user_id).one(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = format!("Order status updated to {}", order.status);
    Ok(ApiResponse::success(
        message,
        AdminOrderEntry {
            order: order_from_entity(order),
            user: owner_info(owner)?,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn parse_status_filter(status: Option<&str>) -> AppResult<Option<OrderStatus>> {
    match status {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => OrderStatus::from_str(s)
            .map(Some)
            .map_err(|_| AppError::BadRequest("Invalid status".into())),
    }
}

async fn load_items(state: &AppState, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();
    Ok(items)
}

fn owner_info(owner: Option<users::Model>) -> AppResult<OrderUser> {
    let owner = owner.ok_or_else(|| AppError::Internal(anyhow::anyhow!("order owner missing")))?;
    Ok(OrderUser {
        name: owner.name,
        email: owner.email,
    })
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        subtotal: model.subtotal,
        tax: model.tax,
        shipping_fee: model.shipping_fee,
        total_amount: model.total_amount,
        status: model.status,
        payment_method: model.payment_method,
        is_paid: model.is_paid,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
        shipping_address: ShippingAddress {
            full_name: model.ship_full_name,
            address: model.ship_address,
            city: model.ship_city,
            postal_code: model.ship_postal_code,
            phone: model.ship_phone,
        },
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        name: model.name,
        price: model.price,
        quantity: model.quantity,
        image: model.image,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
