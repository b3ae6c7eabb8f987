//! Graphlink Application - Protocol core and ports
//!
//! This crate defines the request orchestration layer with:
//! - Port traits for the transport, decoder, secret proof and error parser
//! - The protocol pieces: parameter codec, endpoint resolution, response
//!   classification, multipart encoding and pagination
//! - [`GraphClient`], composing them into API operations and token exchange

pub mod classifier;
pub mod client;
pub mod codec;
pub mod config;
pub mod endpoint;
pub mod multipart;
pub mod pagination;
pub mod ports;
pub mod query;
pub mod tokens;

#[cfg(test)]
mod testing;

pub use classifier::{Classified, FailedResponse};
pub use client::{GraphClient, PreparedCall, redact_url};
pub use config::{ClientConfig, Endpoints};
pub use ports::{
    Decoder, ErrorDetailParser, RequestBody, SecretProof, Transport, TransportRequest,
    TransportResponse,
};
pub use tokens::{DeviceErrorKind, DeviceErrorMapping};
