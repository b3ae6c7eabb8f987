//! Graphlink Domain - Core protocol types
//!
//! This crate defines the domain model for the Graphlink graph API client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod request;
pub mod response;
pub mod version;

pub use auth::{AccessToken, DebugTokenInfo, DeviceCode, Scope};
pub use error::{GraphError, GraphResult, RemoteError};
pub use request::{
    Attachment, BatchHeader, BatchRequest, BatchRequestBuilder, BatchResponse, ByteStream,
    HttpMethod, Parameter, ParameterValue,
};
pub use response::{Cursors, Page, Paging};
pub use version::ApiVersion;
