//! Port adapters backed by third-party crates.

mod reqwest_transport;

pub use reqwest_transport::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, ReqwestTransport};
