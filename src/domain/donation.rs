//! Donation domain entity.
//! Framework-agnostic representation of a recorded donation.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a donation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationStatus {
    Pending,
    Completed,
    Test,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Completed => "completed",
            DonationStatus::Test => "test",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DonationStatus::Pending),
            "completed" => Ok(DonationStatus::Completed),
            "test" => Ok(DonationStatus::Test),
            other => Err(format!("unknown donation status '{}'", other)),
        }
    }
}

/// The gateway object a payment was made against.
///
/// One-time donations are paid against an order, recurring ones against a
/// subscription. Exactly one of the two identifiers exists per donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentReference {
    Order(String),
    Subscription(String),
}

impl PaymentReference {
    pub fn is_recurring(&self) -> bool {
        matches!(self, PaymentReference::Subscription(_))
    }

    pub fn order_id(&self) -> Option<&str> {
        match self {
            PaymentReference::Order(id) => Some(id),
            PaymentReference::Subscription(_) => None,
        }
    }

    pub fn subscription_id(&self) -> Option<&str> {
        match self {
            PaymentReference::Subscription(id) => Some(id),
            PaymentReference::Order(_) => None,
        }
    }
}

/// Donor-supplied free text. Every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorDetails {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub pincode: String,
    pub message: String,
}

/// Domain entity representing a donation.
#[derive(Debug, Clone)]
pub struct Donation {
    pub id: Uuid,
    pub donor: DonorDetails,
    pub amount: BigDecimal,
    pub reference: PaymentReference,
    pub payment_id: String,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    /// A donation whose payment signature has already been verified.
    pub fn completed(
        donor: DonorDetails,
        amount: BigDecimal,
        reference: PaymentReference,
        payment_id: String,
    ) -> Self {
        Self::with_status(donor, amount, reference, payment_id, DonationStatus::Completed)
    }

    pub fn with_status(
        donor: DonorDetails,
        amount: BigDecimal,
        reference: PaymentReference,
        payment_id: String,
        status: DonationStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            donor,
            amount,
            reference,
            payment_id,
            status,
            created_at: Utc::now(),
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.reference.is_recurring()
    }
}
