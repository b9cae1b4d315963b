use std::sync::Arc;

use crate::domain::Donation;
use crate::error::AppError;
use crate::ports::DonationRepository;

pub struct ListDonations {
    repository: Arc<dyn DonationRepository>,
}

impl ListDonations {
    pub fn new(repository: Arc<dyn DonationRepository>) -> Self {
        Self { repository }
    }

    /// Every recorded donation, newest first.
    pub async fn execute(&self) -> Result<Vec<Donation>, AppError> {
        if !self.repository.is_ready() {
            return Err(AppError::StoreUnavailable(
                "Database not connected".to_string(),
            ));
        }

        let donations = self.repository.list().await?;
        tracing::info!(count = donations.len(), "Fetched donations");
        Ok(donations)
    }
}
