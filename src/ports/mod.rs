//! Seams between the use cases and the outside world.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Donation;
use crate::razorpay::{GatewayError, OrderRequest, SubscriptionRequest};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Payment {0} has already been recorded")]
    Duplicate(String),
    #[error("Corrupt record: {0}")]
    InvalidRecord(String),
    #[error("{0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                RepositoryError::Unavailable(err.to_string())
            }
            sqlx::Error::RowNotFound => RepositoryError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(db.message().to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence of donation records.
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Whether a connection to the store has been established.
    fn is_ready(&self) -> bool;

    /// Round-trips a trivial query.
    async fn ping(&self) -> RepositoryResult<()>;

    async fn insert(&self, donation: &Donation) -> RepositoryResult<Donation>;

    /// All donations, newest first.
    async fn list(&self) -> RepositoryResult<Vec<Donation>>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}

/// Remote payment gateway capabilities.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Returns the gateway's order object unchanged.
    async fn create_order(&self, order: &OrderRequest) -> Result<Value, GatewayError>;

    async fn create_subscription(
        &self,
        subscription: &SubscriptionRequest,
    ) -> Result<Value, GatewayError>;

    /// Cheapest authenticated call available, used for connectivity checks.
    async fn probe(&self) -> Result<(), GatewayError>;

    fn key_id(&self) -> &str;
}
