pub mod donation;

pub use donation::{Donation, DonationStatus, DonorDetails, PaymentReference};
