pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod payments;
pub mod ports;
pub mod razorpay;
pub mod startup;
pub mod use_cases;
pub mod utils;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;
use crate::payments::SignatureVerifier;
use crate::ports::{DonationRepository, PaymentGateway};

pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Server-side checkout settings shared by the order and subscription routes.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub plan_id: Option<String>,
    pub default_total_count: Option<u32>,
    pub minor_unit_multiplier: u32,
}

impl CheckoutSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            plan_id: config.razorpay_plan_id.clone(),
            default_total_count: config.razorpay_subscription_cycles,
            minor_unit_multiplier: config.minor_unit_multiplier,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DonationRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub verifier: SignatureVerifier,
    pub checkout: CheckoutSettings,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<dyn DonationRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            store,
            gateway,
            verifier: SignatureVerifier::new(config.razorpay_key_secret.as_str()),
            checkout: CheckoutSettings::from_config(config),
            start_time: Instant::now(),
        }
    }
}

pub fn create_app(state: AppState, config: &Config) -> anyhow::Result<Router> {
    let cors = cors_layer(&config.cors_allowed_origins)?;

    Ok(Router::new()
        .route("/", get(handlers::status))
        .route("/health", get(handlers::health))
        .route("/test-razorpay", get(handlers::checkout::test_razorpay))
        .route("/create-order", post(handlers::checkout::create_order))
        .route(
            "/create-subscription",
            post(handlers::checkout::create_subscription),
        )
        .route("/save-payment", post(handlers::donations::save_payment))
        .route("/donations", get(handlers::donations::list_donations))
        .route("/test-db", get(handlers::donations::test_db))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn_with_state(
            config.log_request_body,
            middleware::request_logger_middleware,
        ))
        .layer(cors)
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(600)))
}
