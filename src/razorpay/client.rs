use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use crate::ports::PaymentGateway;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Razorpay returned {status}: {description}")]
    Api { status: u16, description: String },
    #[error("Razorpay returned an empty response")]
    EmptyResponse,
    #[error("Invalid response from Razorpay: {0}")]
    InvalidResponse(String),
    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderRequest {
    /// Amount in the currency's minor unit.
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
}

/// Body of `POST /subscriptions`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub plan_id: String,
    pub total_count: u32,
    pub customer_notify: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP client for the Razorpay REST API
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl RazorpayClient {
    pub fn new(base_url: String, key_id: String, key_secret: String) -> Self {
        Self::with_circuit_breaker(base_url, key_id, key_secret, 5, 30)
    }

    /// Creates a client with custom circuit breaker configuration
    pub fn with_circuit_breaker(
        base_url: String,
        key_id: String,
        key_secret: String,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        RazorpayClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key_id,
            key_secret,
            circuit_breaker,
        }
    }

    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.key_id, Some(&self.key_secret))
    }

    /// Sends through the circuit breaker shared by order and subscription calls.
    async fn send(&self, request: RequestBuilder) -> Result<Value, GatewayError> {
        let result = self.circuit_breaker.call(execute(request)).await;

        match result {
            Ok(value) => Ok(value),
            Err(FailsafeError::Rejected) => Err(GatewayError::CircuitBreakerOpen(
                "Razorpay API circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

async fn execute(request: RequestBuilder) -> Result<Value, GatewayError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(api_error(status.as_u16(), &body));
    }

    if body.trim().is_empty() {
        return Err(GatewayError::EmptyResponse);
    }

    let value: Value =
        serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
    if value.is_null() {
        return Err(GatewayError::EmptyResponse);
    }

    Ok(value)
}

fn api_error(status: u16, body: &str) -> GatewayError {
    let description = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| {
            envelope.error.description.or(envelope.error.code)
        })
        .unwrap_or_else(|| format!("unexpected response body: {}", truncate(body, 200)));

    GatewayError::Api {
        status,
        description,
    }
}

fn truncate(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, order: &OrderRequest) -> Result<Value, GatewayError> {
        tracing::debug!(amount = order.amount, receipt = %order.receipt, "Creating Razorpay order");
        self.send(self.request(reqwest::Method::POST, "/orders").json(order))
            .await
    }

    async fn create_subscription(
        &self,
        subscription: &SubscriptionRequest,
    ) -> Result<Value, GatewayError> {
        tracing::debug!(
            plan_id = %subscription.plan_id,
            total_count = subscription.total_count,
            "Creating Razorpay subscription"
        );
        self.send(
            self.request(reqwest::Method::POST, "/subscriptions")
                .json(subscription),
        )
        .await
    }

    /// Connectivity checks bypass the circuit breaker so failed checks never
    /// block checkout calls.
    async fn probe(&self) -> Result<(), GatewayError> {
        execute(
            self.request(reqwest::Method::GET, "/payments")
                .query(&[("count", "1")]),
        )
        .await
        .map(|_| ())
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}
