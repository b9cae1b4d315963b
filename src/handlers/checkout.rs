use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::use_cases::{CreateOrder, CreateSubscription, SubscriptionInput};
use crate::validation::lenient_text;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub amount: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSubscriptionRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact: Option<String>,
    #[serde(default)]
    pub total_count: Option<Value>,
}

/// `POST /create-order`
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let order = CreateOrder::new(state.gateway.clone(), state.checkout.minor_unit_multiplier)
        .execute(payload.amount.as_ref())
        .await?;

    Ok(Json(order))
}

/// `POST /create-subscription`
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let output = CreateSubscription::new(
        state.gateway.clone(),
        state.checkout.plan_id.clone(),
        state.checkout.default_total_count,
    )
    .execute(SubscriptionInput {
        name: payload.name,
        email: payload.email,
        contact: payload.contact,
        total_count: payload.total_count,
    })
    .await?;

    Ok(Json(json!({
        "success": true,
        "subscriptionId": output.subscription_id,
        "subscription": output.subscription,
    })))
}

/// `GET /test-razorpay`
pub async fn test_razorpay(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Testing Razorpay connection");
    state.gateway.probe().await?;

    Ok(Json(json!({
        "status": "Razorpay connection successful",
        "key_id": mask_key_id(state.gateway.key_id()),
        "test_result": "API accessible",
    })))
}

fn mask_key_id(key_id: &str) -> String {
    let visible: String = key_id.chars().take(12).collect();
    format!("{}...", visible)
}
