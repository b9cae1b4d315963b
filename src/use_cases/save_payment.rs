//! Verify a completed payment and record the donation.

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Donation, DonorDetails, PaymentReference};
use crate::error::AppError;
use crate::payments::SignatureVerifier;
use crate::ports::DonationRepository;
use crate::validation::{self, ValidationError};

/// Input for the SavePayment use case, as received from the client.
#[derive(Debug, Default)]
pub struct SavePaymentInput {
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub subscription_id: Option<String>,
    pub signature: Option<String>,
    pub is_recurring: bool,
    pub amount: Option<Value>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub pincode: Option<String>,
    pub message: Option<String>,
}

/// Output of the SavePayment use case.
#[derive(Debug)]
pub struct SavePaymentOutput {
    pub donation_id: Uuid,
    pub payment_id: String,
}

pub struct SavePayment {
    repository: Arc<dyn DonationRepository>,
    verifier: SignatureVerifier,
}

impl SavePayment {
    pub fn new(repository: Arc<dyn DonationRepository>, verifier: SignatureVerifier) -> Self {
        Self {
            repository,
            verifier,
        }
    }

    pub async fn execute(&self, input: SavePaymentInput) -> Result<SavePaymentOutput, AppError> {
        let (payment_id, signature) = match (
            validation::required_identifier("paymentId", input.payment_id.as_deref()),
            validation::required_identifier("signature", input.signature.as_deref()),
        ) {
            (Ok(payment_id), Ok(signature)) => (payment_id, signature),
            _ => {
                return Err(AppError::InvalidInput(
                    "Payment verification failed: Missing required fields".to_string(),
                ))
            }
        };

        let reference = if input.is_recurring {
            PaymentReference::Subscription(
                validation::required_identifier("subscriptionId", input.subscription_id.as_deref())
                    .map_err(|_| missing("subscriptionId for recurring payment"))?,
            )
        } else {
            PaymentReference::Order(
                validation::required_identifier("orderId", input.order_id.as_deref())
                    .map_err(|_| missing("orderId for one-time payment"))?,
            )
        };

        let amount = validation::parse_positive_amount(input.amount.as_ref())?;

        if let Err(e) = self.verifier.verify_payment(&payment_id, &reference, &signature) {
            tracing::warn!(payment_id = %payment_id, "Payment verification failed: signature mismatch");
            return Err(e.into());
        }
        tracing::info!(payment_id = %payment_id, recurring = reference.is_recurring(), "Payment signature verified");

        if !self.repository.is_ready() {
            tracing::warn!(payment_id = %payment_id, "Store not connected, payment verified but not saved");
            return Err(AppError::StoreUnavailable(
                "Payment verified but database not available for saving".to_string(),
            ));
        }

        let donation = Donation::completed(
            DonorDetails {
                name: text(input.name),
                email: text(input.email),
                contact: text(input.contact),
                address: text(input.address),
                pincode: text(input.pincode),
                message: input.message.unwrap_or_default(),
            },
            amount,
            reference,
            payment_id,
        );

        let saved = self.repository.insert(&donation).await?;
        tracing::info!(donation_id = %saved.id, payment_id = %saved.payment_id, "Donation saved");

        Ok(SavePaymentOutput {
            donation_id: saved.id,
            payment_id: saved.payment_id,
        })
    }
}

fn missing(what: &'static str) -> ValidationError {
    ValidationError::new("payment", format!("Missing {}", what))
}

fn text(value: Option<String>) -> String {
    value
        .map(|v| validation::sanitize_string(&v))
        .unwrap_or_default()
}
