//! Recurring donation subscription creation.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::AppError;
use crate::ports::PaymentGateway;
use crate::razorpay::SubscriptionRequest;
use crate::validation;

/// Billing cycles used when neither the request nor the server names one.
pub const FALLBACK_TOTAL_COUNT: u32 = 12;

#[derive(Debug, Default)]
pub struct SubscriptionInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub total_count: Option<Value>,
}

#[derive(Debug)]
pub struct SubscriptionOutput {
    pub subscription_id: String,
    pub subscription: Value,
}

pub struct CreateSubscription {
    gateway: Arc<dyn PaymentGateway>,
    plan_id: Option<String>,
    default_total_count: Option<u32>,
}

impl CreateSubscription {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        plan_id: Option<String>,
        default_total_count: Option<u32>,
    ) -> Self {
        Self {
            gateway,
            plan_id,
            default_total_count,
        }
    }

    /// Request value, then server default, then [`FALLBACK_TOTAL_COUNT`].
    pub fn resolve_total_count(&self, requested: Option<&Value>) -> u32 {
        validation::positive_count(requested)
            .or(self.default_total_count.filter(|count| *count > 0))
            .unwrap_or(FALLBACK_TOTAL_COUNT)
    }

    pub async fn execute(&self, input: SubscriptionInput) -> Result<SubscriptionOutput, AppError> {
        let plan_id = self.plan_id.clone().ok_or_else(|| {
            AppError::ServerMisconfigured("Plan ID not configured on server".to_string())
        })?;

        let total_count = self.resolve_total_count(input.total_count.as_ref());

        let mut notes = BTreeMap::new();
        for (key, value) in [
            ("name", input.name),
            ("email", input.email),
            ("contact", input.contact),
        ] {
            if let Some(value) = value.map(|v| validation::sanitize_string(&v)) {
                if !value.is_empty() {
                    notes.insert(key.to_string(), value);
                }
            }
        }

        let request = SubscriptionRequest {
            plan_id,
            total_count,
            customer_notify: true,
            notes,
        };
        tracing::info!(plan_id = %request.plan_id, total_count, "Creating subscription");

        let subscription = self.gateway.create_subscription(&request).await?;
        let subscription_id = subscription
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Gateway("Razorpay subscription response has no id".to_string())
            })?;
        tracing::info!(subscription_id = %subscription_id, "Subscription created");

        Ok(SubscriptionOutput {
            subscription_id,
            subscription,
        })
    }
}
