//! Binary attachment types

use std::fmt;
use std::io;

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};

use crate::error::{GraphError, GraphResult};

/// A lazily produced stream of bytes.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// A binary file sent with a multipart `POST`.
///
/// The data stream is consumed exactly once: encoding an attachment moves it.
pub struct Attachment {
    filename: String,
    field_name: String,
    content_type: String,
    data: ByteStream,
}

impl Attachment {
    /// Creates an attachment from a byte stream.
    ///
    /// The form field name defaults to the filename without its extension.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the filename or content type is blank,
    /// or contains a quote or line break.
    pub fn from_stream<S>(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: S,
    ) -> GraphResult<Self>
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        let filename = filename.into();
        let content_type = content_type.into();
        verify_header_value("filename", &filename)?;
        verify_header_value("content type", &content_type)?;

        Ok(Self {
            field_name: default_field_name(&filename).to_string(),
            filename,
            content_type,
            data: data.boxed(),
        })
    }

    /// Creates an attachment from bytes already in memory.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the filename or content type is blank,
    /// or contains a quote or line break.
    pub fn from_bytes(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> GraphResult<Self> {
        let chunk: io::Result<Bytes> = Ok(data.into());
        Self::from_stream(filename, content_type, stream::once(async move { chunk }))
    }

    /// Overrides the form field name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the field name is blank, or contains a
    /// quote or line break.
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> GraphResult<Self> {
        let field_name = field_name.into();
        verify_header_value("field name", &field_name)?;
        self.field_name = field_name;
        Ok(self)
    }

    /// Returns the filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the form field name.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Consumes the attachment and returns its data stream.
    #[must_use]
    pub fn into_data(self) -> ByteStream {
        self.data
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("field_name", &self.field_name)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Attachment names are quoted inside the part headers.
fn verify_header_value(kind: &str, value: &str) -> GraphResult<()> {
    if value.trim().is_empty() {
        return Err(GraphError::invalid_argument(format!(
            "attachment {kind} cannot be blank"
        )));
    }
    if value.contains(['"', '\r', '\n']) {
        return Err(GraphError::invalid_argument(format!(
            "attachment {kind} cannot contain quotes or line breaks: {value:?}"
        )));
    }
    Ok(())
}

/// Strips the extension from a filename, e.g. `"test.png"` becomes `"test"`.
fn default_field_name(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(index) if index > 0 => &filename[..index],
        _ => filename,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_field_name() {
        assert_eq!(default_field_name("test.png"), "test");
        assert_eq!(default_field_name("archive.tar.gz"), "archive.tar");
        assert_eq!(default_field_name("README"), "README");
        assert_eq!(default_field_name(".profile"), ".profile");
    }

    #[test]
    fn test_attachment_defaults_field_name() {
        let attachment = Attachment::from_bytes("cat.jpg", "image/jpeg", &b"jpeg"[..]).unwrap();
        assert_eq!(attachment.filename(), "cat.jpg");
        assert_eq!(attachment.field_name(), "cat");
        assert_eq!(attachment.content_type(), "image/jpeg");
    }

    #[test]
    fn test_attachment_explicit_field_name() {
        let attachment = Attachment::from_bytes("cat.jpg", "image/jpeg", &b"jpeg"[..])
            .unwrap()
            .with_field_name("source")
            .unwrap();
        assert_eq!(attachment.field_name(), "source");
    }

    #[test]
    fn test_attachment_rejects_blank_values() {
        assert!(matches!(
            Attachment::from_bytes("  ", "image/jpeg", &b""[..]),
            Err(GraphError::InvalidArgument(_))
        ));
        assert!(matches!(
            Attachment::from_bytes("a.jpg", "", &b""[..]),
            Err(GraphError::InvalidArgument(_))
        ));
        let attachment = Attachment::from_bytes("a.jpg", "image/jpeg", &b""[..]).unwrap();
        assert!(matches!(
            attachment.with_field_name(""),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_attachment_rejects_header_breaking_names() {
        for filename in ["a\".jpg", "a\r\nX-Injected: 1.jpg", "a\n.jpg"] {
            assert!(
                matches!(
                    Attachment::from_bytes(filename, "image/jpeg", &b""[..]),
                    Err(GraphError::InvalidArgument(_))
                ),
                "{filename:?} must be rejected"
            );
        }
        assert!(matches!(
            Attachment::from_bytes("a.jpg", "image/jpeg\r\nX: 1", &b""[..]),
            Err(GraphError::InvalidArgument(_))
        ));
        let attachment = Attachment::from_bytes("a.jpg", "image/jpeg", &b""[..]).unwrap();
        assert!(matches!(
            attachment.with_field_name("source\""),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_into_data_yields_bytes() {
        let attachment = Attachment::from_bytes("a.txt", "text/plain", "hello").unwrap();
        let chunks: Vec<Bytes> = attachment.into_data().try_collect().await.unwrap();
        assert_eq!(chunks, vec![Bytes::from("hello")]);
    }
}
