//! POST body encoding.
//!
//! With no attachments the ordered fields are urlencoded into one buffer.
//! With attachments, fields and files are merged into a single hash-ordering
//! pass and emitted as a multipart form with a randomly generated boundary.
//! Path-backed file parts stream lazily from their open handle; the handle is
//! owned by the body and released on every exit path, including encode
//! failures partway through.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio_util::io::ReaderStream;
use tracing::debug;

use fg_core::error::{FgError, FgResult};

use crate::ordering;

/// A file to include as a multipart part.
///
/// Exactly one source is set: an on-disk path (opened per execution attempt,
/// streamed) or an in-memory buffer (no handle involved).
#[derive(Debug, Clone)]
pub struct FileAttachment {
    source: FileSource,
    file_name: String,
    mime_type: String,
}

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

impl FileAttachment {
    /// Attach an on-disk file. Fails immediately if the path does not point
    /// to a readable regular file, before any network activity.
    pub fn from_path(path: &Path, mime_type: &str) -> FgResult<Self> {
        if !path.is_file() {
            return Err(FgError::Usage(format!(
                "attachment is not a readable file: {}",
                path.display()
            )));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                FgError::Usage(format!("attachment path has no file name: {}", path.display()))
            })?;
        Ok(Self {
            source: FileSource::Path(path.to_path_buf()),
            file_name,
            mime_type: mime_type.to_string(),
        })
    }

    /// Attach an in-memory buffer under the given file name.
    pub fn from_bytes(data: Vec<u8>, file_name: &str, mime_type: &str) -> Self {
        Self {
            source: FileSource::Memory(data),
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
        }
    }

    /// The file name reported in the part's Content-Disposition header.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Whether this attachment is backed by an on-disk path.
    pub fn is_path_backed(&self) -> bool {
        matches!(self.source, FileSource::Path(_))
    }

    /// Build the multipart part for this attachment, opening the handle for
    /// path-backed sources. The handle is consumed into the part's body
    /// stream, so it cannot outlive the request that carries it.
    async fn into_part(self) -> FgResult<Part> {
        let part = match self.source {
            FileSource::Path(path) => {
                let file = tokio::fs::File::open(&path).await?;
                let len = file.metadata().await?.len();
                Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
            }
            FileSource::Memory(data) => Part::bytes(data),
        };
        part.file_name(self.file_name)
            .mime_str(&self.mime_type)
            .map_err(|e| FgError::Usage(format!("invalid mime type: {e}")))
    }
}

/// Encoded POST body, ready to hand to the transport.
#[derive(Debug)]
pub enum EncodedBody {
    /// Urlencoded field buffer.
    UrlEncoded(String),
    /// Multipart form carrying fields and file parts in rank order.
    Multipart(Form),
}

enum MergedPart {
    Field(String),
    File(FileAttachment),
}

/// Encode ordered POST fields and attachments into a body.
///
/// `fields` must already be in serialization order (and signed, if the
/// request demands it); this function preserves that order for the
/// urlencoded case and re-ranks the merged field+file set for multipart.
pub async fn encode(
    fields: Vec<(String, String)>,
    files: Vec<(String, FileAttachment)>,
) -> FgResult<EncodedBody> {
    if files.is_empty() {
        let encoded = serde_urlencoded::to_string(&fields)
            .map_err(|e| FgError::Serialization(format!("urlencode failed: {e}")))?;
        return Ok(EncodedBody::UrlEncoded(encoded));
    }

    // Files participate in the same ordering index as plain fields.
    let mut merged: Vec<(String, MergedPart)> = fields
        .into_iter()
        .map(|(k, v)| (k, MergedPart::Field(v)))
        .chain(files.into_iter().map(|(k, f)| (k, MergedPart::File(f))))
        .collect();
    ordering::sort_by_key_rank(&mut merged, |(key, _)| key);

    let mut form = Form::new();
    for (name, part) in merged {
        form = match part {
            MergedPart::Field(value) => form.text(name, value),
            MergedPart::File(attachment) => {
                debug!("attaching file part {} ({})", name, attachment.file_name());
                form.part(name, attachment.into_part().await?)
            }
        };
    }

    Ok(EncodedBody::Multipart(form))
}
