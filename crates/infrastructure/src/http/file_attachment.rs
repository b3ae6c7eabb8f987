//! Attachments streamed from files.

use std::path::Path;

use tokio_util::io::ReaderStream;

use graphlink_domain::{Attachment, GraphError, GraphResult};

/// Opens a file as an attachment.
///
/// The filename is taken from the path and the content type is guessed
/// from its extension, falling back to `application/octet-stream`. The
/// file is read while the request is sent, not up front.
///
/// # Errors
///
/// Returns `InvalidArgument` if the file cannot be opened or has no
/// usable file name.
pub async fn file_attachment(path: impl AsRef<Path>) -> GraphResult<Attachment> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            GraphError::invalid_argument(format!("{} has no file name", path.display()))
        })?
        .to_string();
    file_attachment_named(path, filename).await
}

/// Opens a file as an attachment sent under a different filename.
///
/// # Errors
///
/// Returns `InvalidArgument` if the file cannot be opened or `filename`
/// is blank.
pub async fn file_attachment_named(
    path: impl AsRef<Path>,
    filename: impl Into<String>,
) -> GraphResult<Attachment> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        GraphError::invalid_argument(format!("cannot open {}: {e}", path.display()))
    })?;

    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    Attachment::from_stream(filename, content_type, ReaderStream::new(file))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_attachment_guesses_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holiday.jpg");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"JPEGDATA")
            .unwrap();

        let attachment = file_attachment(&path).await.unwrap();
        assert_eq!(attachment.filename(), "holiday.jpg");
        assert_eq!(attachment.field_name(), "holiday");
        assert_eq!(attachment.content_type(), "image/jpeg");

        let chunks: Vec<_> = attachment.into_data().try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"JPEGDATA");
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzqx");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();

        let attachment = file_attachment_named(&path, "upload.bin").await.unwrap();
        assert_eq!(attachment.filename(), "upload.bin");
        assert_eq!(attachment.content_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = file_attachment(dir.path().join("missing.png")).await;
        assert!(matches!(result, Err(GraphError::InvalidArgument(_))));
    }
}
