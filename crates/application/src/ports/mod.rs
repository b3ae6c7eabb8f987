//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the protocol core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod decoder;
mod error_parser;
mod secret_proof;
mod transport;

pub use decoder::Decoder;
pub use error_parser::ErrorDetailParser;
pub use secret_proof::SecretProof;
pub use transport::{RequestBody, Transport, TransportRequest, TransportResponse};
