pub mod create_order;
pub mod create_subscription;
pub mod list_donations;
pub mod probe_store;
pub mod save_payment;

pub use create_order::CreateOrder;
pub use create_subscription::{CreateSubscription, SubscriptionInput, SubscriptionOutput};
pub use list_donations::ListDonations;
pub use probe_store::ProbeStore;
pub use save_payment::{SavePayment, SavePaymentInput, SavePaymentOutput};
