pub mod signature;

pub use signature::{canonical_message, SignatureError, SignatureVerifier};
