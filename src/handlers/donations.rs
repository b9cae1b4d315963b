use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use bigdecimal::ToPrimitive;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::Donation;
use crate::error::AppError;
use crate::use_cases::{ListDonations, ProbeStore, SavePayment, SavePaymentInput};
use crate::validation::{lenient_flag, lenient_text};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePaymentRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub payment_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subscription_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub signature: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_recurring: bool,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pincode: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
}

impl From<SavePaymentRequest> for SavePaymentInput {
    fn from(req: SavePaymentRequest) -> Self {
        SavePaymentInput {
            payment_id: req.payment_id,
            order_id: req.order_id,
            subscription_id: req.subscription_id,
            signature: req.signature,
            is_recurring: req.is_recurring,
            amount: req.amount,
            name: req.name,
            email: req.email,
            contact: req.contact,
            address: req.address,
            pincode: req.pincode,
            message: req.message,
        }
    }
}

/// JSON shape of a donation in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub pincode: String,
    pub message: String,
    pub amount: f64,
    pub is_recurring: bool,
    pub order_id: Option<String>,
    pub subscription_id: Option<String>,
    pub payment_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Donation> for DonationView {
    fn from(donation: Donation) -> Self {
        DonationView {
            id: donation.id,
            is_recurring: donation.is_recurring(),
            order_id: donation.reference.order_id().map(str::to_string),
            subscription_id: donation.reference.subscription_id().map(str::to_string),
            amount: donation.amount.to_f64().unwrap_or_default(),
            name: donation.donor.name,
            email: donation.donor.email,
            contact: donation.donor.contact,
            address: donation.donor.address,
            pincode: donation.donor.pincode,
            message: donation.donor.message,
            payment_id: donation.payment_id,
            status: donation.status.to_string(),
            created_at: donation.created_at,
        }
    }
}

/// `POST /save-payment`
pub async fn save_payment(
    State(state): State<AppState>,
    payload: Result<Json<SavePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let output = SavePayment::new(state.store.clone(), state.verifier.clone())
        .execute(payload.into())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Donation verified and saved successfully",
        "donationId": output.donation_id,
        "paymentId": output.payment_id,
    })))
}

/// `GET /donations`
pub async fn list_donations(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let donations: Vec<DonationView> = ListDonations::new(state.store.clone())
        .execute()
        .await?
        .into_iter()
        .map(DonationView::from)
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": donations.len(),
        "donations": donations,
    })))
}

/// `GET /test-db`
pub async fn test_db(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Testing database connection");
    ProbeStore::new(state.store.clone()).execute().await?;

    Ok(Json(json!({
        "status": "Database connection working",
        "test_result": "Successfully created and deleted test document",
    })))
}
