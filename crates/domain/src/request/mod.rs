//! Request-side domain types

mod attachment;
mod batch;
mod method;
mod parameter;

pub use attachment::{Attachment, ByteStream};
pub use batch::{BatchHeader, BatchRequest, BatchRequestBuilder, BatchResponse};
pub use method::HttpMethod;
pub use parameter::{Parameter, ParameterValue};
