use sportzone_api::{
    db::{create_orm_conn, create_pool},
    dto::cart::{AddToCartRequest, SetQuantityRequest},
    error::AppError,
    models::Category,
    pricing::PricingPolicy,
    services::cart_service,
    state::AppState,
};
use uuid::Uuid;

// Cart behaviour against a real database. Tests use a fresh random session
// id each so they never interfere with each other or with other suites.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run cart flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = create_orm_conn(&database_url).await?;

    Ok(Some(AppState {
        pool,
        orm,
        pricing: PricingPolicy::default(),
    }))
}

fn add_request(session_id: &str, product_id: Uuid, price: i64, quantity: i32) -> AddToCartRequest {
    AddToCartRequest {
        session_id: session_id.to_string(),
        product_id,
        name: "Match Football".into(),
        price,
        category: Category::Equipment,
        image: None,
        quantity: Some(quantity),
    }
}

#[tokio::test]
async fn add_merges_lines_and_derives_totals() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = Uuid::new_v4().to_string();
    let product = Uuid::new_v4();

    cart_service::add_item(&state, add_request(&session, product, 5_000, 1)).await?;
    let resp = cart_service::add_item(&state, add_request(&session, product, 5_000, 2)).await?;
    let view = resp.data.expect("cart view");

    assert_eq!(view.items.len(), 1, "same product must merge into one line");
    assert_eq!(view.items[0].quantity, 3);
    assert_eq!(view.total_items, 3);
    assert_eq!(view.total_amount, 15_000);

    Ok(())
}

#[tokio::test]
async fn set_quantity_overwrites_and_zero_removes() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = Uuid::new_v4().to_string();
    let product = Uuid::new_v4();

    cart_service::add_item(&state, add_request(&session, product, 2_500, 2)).await?;

    let resp = cart_service::set_quantity(
        &state,
        product,
        SetQuantityRequest {
            session_id: session.clone(),
            quantity: 5,
        },
    )
    .await?;
    let view = resp.data.expect("cart view");
    assert_eq!(view.items[0].quantity, 5);
    assert_eq!(view.total_amount, 12_500);

    let resp = cart_service::set_quantity(
        &state,
        product,
        SetQuantityRequest {
            session_id: session.clone(),
            quantity: 0,
        },
    )
    .await?;
    let view = resp.data.expect("cart view");
    assert!(view.items.is_empty());
    assert_eq!(view.total_amount, 0);
    assert_eq!(view.total_items, 0);

    Ok(())
}

#[tokio::test]
async fn missing_line_operations_return_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = Uuid::new_v4().to_string();
    let absent = Uuid::new_v4();

    let err = cart_service::set_quantity(
        &state,
        absent,
        SetQuantityRequest {
            session_id: session.clone(),
            quantity: 2,
        },
    )
    .await
    .expect_err("absent line");
    assert!(matches!(err, AppError::NotFound));

    let err = cart_service::remove_item(&state, &session, absent)
        .await
        .expect_err("absent line");
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn clear_is_idempotent() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let session = Uuid::new_v4().to_string();

    cart_service::add_item(&state, add_request(&session, Uuid::new_v4(), 1_000, 1)).await?;
    cart_service::clear(&state, &session).await?;
    // Clearing an already empty cart must also succeed.
    let resp = cart_service::clear(&state, &session).await?;
    let view = resp.data.expect("cart view");
    assert!(view.items.is_empty());

    let resp = cart_service::get_cart(&state, &session).await?;
    assert!(resp.data.expect("cart view").items.is_empty());

    Ok(())
}

#[tokio::test]
async fn blank_session_id_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let err = cart_service::get_cart(&state, "").await.expect_err("blank session");
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = cart_service::add_item(&state, add_request("", Uuid::new_v4(), 1_000, 1))
        .await
        .expect_err("blank session");
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}
