//! One-time donation order creation.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::error::AppError;
use crate::ports::PaymentGateway;
use crate::razorpay::{OrderRequest, CURRENCY};
use crate::validation;

pub struct CreateOrder {
    gateway: Arc<dyn PaymentGateway>,
    minor_unit_multiplier: u32,
}

impl CreateOrder {
    pub fn new(gateway: Arc<dyn PaymentGateway>, minor_unit_multiplier: u32) -> Self {
        Self {
            gateway,
            minor_unit_multiplier,
        }
    }

    /// Creates a gateway order for `amount` (major units) and returns the
    /// gateway's order object unchanged.
    pub async fn execute(&self, amount: Option<&Value>) -> Result<Value, AppError> {
        let amount = validation::parse_positive_amount(amount)?;
        let minor_units = validation::to_minor_units(&amount, self.minor_unit_multiplier)?;

        let request = OrderRequest {
            amount: minor_units,
            currency: CURRENCY.to_string(),
            receipt: format!("receipt_donation_{}", Utc::now().timestamp_millis()),
        };
        tracing::info!(amount = %amount, minor_units, "Creating order");

        let order = self.gateway.create_order(&request).await?;
        match order.get("id").and_then(Value::as_str) {
            Some(id) => tracing::info!(order_id = id, "Order created"),
            None => {
                return Err(AppError::Gateway(
                    "Razorpay order creation failed".to_string(),
                ))
            }
        }

        Ok(order)
    }
}
