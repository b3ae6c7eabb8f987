//! HTTP body sources.

mod file_attachment;

pub use file_attachment::{file_attachment, file_attachment_named};
