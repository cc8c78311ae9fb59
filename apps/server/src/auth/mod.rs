pub mod signature;

pub use signature::{SignatureGate, SIGNATURE_HEADER, TIMESTAMP_HEADER};
