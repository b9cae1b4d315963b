pub mod client;

pub use client::{GatewayError, OrderRequest, RazorpayClient, SubscriptionRequest};

/// Currency every order is created in.
pub const CURRENCY: &str = "INR";
