//! Write/delete round trip against the donation store.

use bigdecimal::BigDecimal;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::{Donation, DonationStatus, DonorDetails, PaymentReference};
use crate::error::AppError;
use crate::ports::DonationRepository;

pub struct ProbeStore {
    repository: Arc<dyn DonationRepository>,
}

impl ProbeStore {
    pub fn new(repository: Arc<dyn DonationRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<(), AppError> {
        if !self.repository.is_ready() {
            return Err(AppError::StoreUnavailable(
                "Database not connected".to_string(),
            ));
        }

        let stamp = Utc::now().timestamp_millis();
        let probe = Donation::with_status(
            DonorDetails {
                name: "Test User".to_string(),
                email: "test@example.com".to_string(),
                ..DonorDetails::default()
            },
            BigDecimal::from(1),
            PaymentReference::Order(format!("test_order_{}", stamp)),
            format!("test_payment_{}", stamp),
            DonationStatus::Test,
        );

        let saved = self.repository.insert(&probe).await?;
        tracing::info!(donation_id = %saved.id, "Test document saved");

        self.repository.delete(saved.id).await?;
        tracing::info!(donation_id = %saved.id, "Test document deleted");

        Ok(())
    }
}
