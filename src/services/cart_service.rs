use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartView, SetQuantityRequest},
    entity::cart_items::{
        ActiveModel as CartLineActive, Column as CartCol, Entity as CartItems,
        Model as CartLineModel,
    },
    error::{AppError, AppResult},
    models::CartLine,
    response::{ApiResponse, Meta},
    state::AppState,
};

// Carts are keyed by a caller-supplied opaque session id. There is no
// shared fallback session: an absent id is a client bug, not a cart.
fn validate_session(session_id: &str) -> AppResult<()> {
    if session_id.trim().is_empty() {
        return Err(AppError::BadRequest("session_id is required".into()));
    }
    Ok(())
}

pub async fn get_cart(state: &AppState, session_id: &str) -> AppResult<ApiResponse<CartView>> {
    validate_session(session_id)?;
    let view = load_view(state, session_id).await?;
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

pub async fn add_item(
    state: &AppState,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    validate_session(&payload.session_id)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Product id, name, and price are required".into(),
        ));
    }
    if payload.price < 0 {
        return Err(AppError::BadRequest("price cannot be negative".into()));
    }
    let quantity = payload.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }

    let existing = CartItems::find()
        .filter(CartCol::SessionId.eq(payload.session_id.as_str()))
        .filter(CartCol::ProductId.eq(payload.product_id))
        .one(&state.orm)
        .await?;

    match existing {
        // Same product again: merge into the existing line.
        Some(line) => {
            let merged = line.quantity + quantity;
            let mut active: CartLineActive = line.into();
            active.quantity = Set(merged);
            active.update(&state.orm).await?;
        }
        None => {
            CartLineActive {
                id: Set(Uuid::new_v4()),
                session_id: Set(payload.session_id.clone()),
                product_id: Set(payload.product_id),
                name: Set(payload.name),
                price: Set(payload.price),
                category: Set(payload.category),
                image: Set(payload.image),
                quantity: Set(quantity),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?;
        }
    }

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({
            "session_id": payload.session_id,
            "product_id": payload.product_id,
            "quantity": quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let view = load_view(state, &payload.session_id).await?;
    Ok(ApiResponse::success(
        "Item added to cart",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn set_quantity(
    state: &AppState,
    product_id: Uuid,
    payload: SetQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    validate_session(&payload.session_id)?;

    let line = CartItems::find()
        .filter(CartCol::SessionId.eq(payload.session_id.as_str()))
        .filter(CartCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?;
    let line = match line {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };

    if payload.quantity <= 0 {
        CartItems::delete_by_id(line.id).exec(&state.orm).await?;
    } else {
        let mut active: CartLineActive = line.into();
        active.quantity = Set(payload.quantity);
        active.update(&state.orm).await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({
            "session_id": payload.session_id,
            "product_id": product_id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let view = load_view(state, &payload.session_id).await?;
    Ok(ApiResponse::success(
        "Cart updated successfully",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    session_id: &str,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    validate_session(session_id)?;

    let result = CartItems::delete_many()
        .filter(CartCol::SessionId.eq(session_id))
        .filter(CartCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "session_id": session_id, "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let view = load_view(state, session_id).await?;
    Ok(ApiResponse::success(
        "Item removed from cart",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn clear(state: &AppState, session_id: &str) -> AppResult<ApiResponse<CartView>> {
    validate_session(session_id)?;

    CartItems::delete_many()
        .filter(CartCol::SessionId.eq(session_id))
        .exec(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "cart_clear",
        Some("cart_items"),
        Some(serde_json::json!({ "session_id": session_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Cart cleared successfully",
        CartView::from_lines(Vec::new()),
        Some(Meta::empty()),
    ))
}

async fn load_view(state: &AppState, session_id: &str) -> AppResult<CartView> {
    let lines = CartItems::find()
        .filter(CartCol::SessionId.eq(session_id))
        .order_by_asc(CartCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(line_from_entity)
        .collect();
    Ok(CartView::from_lines(lines))
}

fn line_from_entity(model: CartLineModel) -> CartLine {
    CartLine {
        product_id: model.product_id,
        name: model.name,
        price: model.price,
        category: model.category,
        image: model.image,
        quantity: model.quantity,
    }
}
