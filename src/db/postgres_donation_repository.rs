//! Postgres implementation of DonationRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::PoolSlot;
use crate::domain::{Donation, DonationStatus, DonorDetails, PaymentReference};
use crate::ports::{DonationRepository, RepositoryError, RepositoryResult};

/// Postgres-backed donation repository.
#[derive(Clone)]
pub struct PostgresDonationRepository {
    slot: PoolSlot,
}

impl PostgresDonationRepository {
    pub fn new(slot: PoolSlot) -> Self {
        Self { slot }
    }

    fn pool(&self) -> RepositoryResult<PgPool> {
        self.slot
            .get()
            .ok_or_else(|| RepositoryError::Unavailable("database not connected".to_string()))
    }
}

#[async_trait]
impl DonationRepository for PostgresDonationRepository {
    fn is_ready(&self) -> bool {
        self.slot.is_ready()
    }

    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool()?)
            .await
            .map_err(RepositoryError::from)?;
        Ok(())
    }

    async fn insert(&self, donation: &Donation) -> RepositoryResult<Donation> {
        let row = sqlx::query_as::<_, DonationRow>(
            r#"
            INSERT INTO donations (
                id, name, email, contact, address, pincode, message,
                amount, is_recurring, order_id, subscription_id, payment_id,
                status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id, name, email, contact, address, pincode, message,
                amount, is_recurring, order_id, subscription_id, payment_id,
                status, created_at
            "#,
        )
        .bind(donation.id)
        .bind(&donation.donor.name)
        .bind(&donation.donor.email)
        .bind(&donation.donor.contact)
        .bind(&donation.donor.address)
        .bind(&donation.donor.pincode)
        .bind(&donation.donor.message)
        .bind(&donation.amount)
        .bind(donation.is_recurring())
        .bind(donation.reference.order_id())
        .bind(donation.reference.subscription_id())
        .bind(&donation.payment_id)
        .bind(donation.status.as_str())
        .bind(donation.created_at)
        .fetch_one(&self.pool()?)
        .await
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::Duplicate(_) => {
                RepositoryError::Duplicate(donation.payment_id.clone())
            }
            other => other,
        })?;

        row.into_domain()
    }

    async fn list(&self) -> RepositoryResult<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(
            "SELECT * FROM donations ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool()?)
        .await
        .map_err(RepositoryError::from)?;

        rows.into_iter().map(DonationRow::into_domain).collect()
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(id)
            .execute(&self.pool()?)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct DonationRow {
    id: Uuid,
    name: String,
    email: String,
    contact: String,
    address: String,
    pincode: String,
    message: String,
    amount: BigDecimal,
    is_recurring: bool,
    order_id: Option<String>,
    subscription_id: Option<String>,
    payment_id: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl DonationRow {
    fn into_domain(self) -> RepositoryResult<Donation> {
        let reference = match (self.is_recurring, self.order_id, self.subscription_id) {
            (false, Some(order_id), None) => PaymentReference::Order(order_id),
            (true, None, Some(subscription_id)) => PaymentReference::Subscription(subscription_id),
            _ => {
                return Err(RepositoryError::InvalidRecord(format!(
                    "donation {} has inconsistent order/subscription identifiers",
                    self.id
                )))
            }
        };

        let status = self
            .status
            .parse::<DonationStatus>()
            .map_err(RepositoryError::InvalidRecord)?;

        Ok(Donation {
            id: self.id,
            donor: DonorDetails {
                name: self.name,
                email: self.email,
                contact: self.contact,
                address: self.address,
                pincode: self.pincode,
                message: self.message,
            },
            amount: self.amount,
            reference,
            payment_id: self.payment_id,
            status,
            created_at: self.created_at,
        })
    }
}
