//! Token exchange domain types

mod types;

pub use types::{AccessToken, DebugTokenInfo, DeviceCode, Scope};
