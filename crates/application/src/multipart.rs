//! Streaming `multipart/form-data` encoder
//!
//! The body is assembled as a stream of frames around each attachment's
//! own stream, so file contents are never buffered as a whole.

use bytes::Bytes;
use futures::stream::{self, StreamExt};

use graphlink_domain::{Attachment, ByteStream, GraphError, GraphResult};

/// Boundary separating the parts of a multipart body.
pub const MULTIPART_BOUNDARY: &str = "**boundarystringwhichwill**neverbeencounteredinthewild**";

const CRLF: &str = "\r\n";

/// `Content-Type` header value of a multipart body.
#[must_use]
pub fn content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}

/// Request headers sent with a multipart body.
#[must_use]
pub fn headers() -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), content_type()),
        ("Connection".to_string(), "keep-alive".to_string()),
    ]
}

fn part_head(attachment: &Attachment) -> Bytes {
    Bytes::from(format!(
        "--{MULTIPART_BOUNDARY}{CRLF}\
         Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"{CRLF}\
         Content-Type: {}{CRLF}{CRLF}",
        attachment.field_name(),
        attachment.filename(),
        attachment.content_type(),
    ))
}

fn frame(bytes: Bytes) -> ByteStream {
    stream::once(async move { Ok::<_, std::io::Error>(bytes) }).boxed()
}

/// Encodes attachments into a multipart body stream.
///
/// Parts appear in the order given, followed by a single closing boundary.
///
/// # Errors
///
/// Returns `InvalidArgument` if `attachments` is empty.
pub fn encode(attachments: Vec<Attachment>) -> GraphResult<ByteStream> {
    if attachments.is_empty() {
        return Err(GraphError::invalid_argument(
            "a multipart request needs at least one attachment",
        ));
    }

    let parts = attachments.into_iter().map(|attachment| {
        let head = part_head(&attachment);
        frame(head)
            .chain(attachment.into_data())
            .chain(frame(Bytes::from_static(CRLF.as_bytes())))
            .boxed()
    });
    let closing = Bytes::from(format!("--{MULTIPART_BOUNDARY}--{CRLF}"));

    Ok(stream::iter(parts).flatten().chain(frame(closing)).boxed())
}
