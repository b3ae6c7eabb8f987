//! Graphlink Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus [`GraphClientBuilder`] to wire
//! them into a ready-to-use client.

pub mod adapters;
pub mod auth;
pub mod builder;
pub mod errors;
pub mod http;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use auth::HmacSha256Proof;
pub use builder::GraphClientBuilder;
pub use errors::GraphErrorParser;
pub use http::{file_attachment, file_attachment_named};
pub use serialization::JsonDecoder;

/// A client wired with the default adapters.
pub type DefaultGraphClient = graphlink_application::GraphClient<JsonDecoder>;
