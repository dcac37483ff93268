//! Upload candidates and the admission policy applied to them.

use crate::error::UploadError;
use crate::limit::SizeLimit;

/// The only content type the library admits. The header is trusted as-is;
/// payload bytes are never sniffed.
pub(crate) const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A candidate document as handed over by the upload source.
///
/// Whole-file buffering is assumed: `bytes` is the complete document. The
/// declared size is always derived from the buffer itself, so the stored
/// `size` field can never disagree with the payload length.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename, kept as an opaque display string.
    pub name: String,
    /// MIME type as reported by the upload source.
    pub content_type: String,
    /// The complete document content.
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), content_type: content_type.into(), bytes }
    }

    /// Byte length of the document.
    pub fn declared_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Run the admission checks, in order: size limit first (inclusive
    /// boundary), then content type.
    pub(crate) fn admit(&self, limit: SizeLimit) -> Result<(), UploadError> {
        if self.declared_size() > limit.bytes() {
            return Err(UploadError::SizeLimitExceeded {
                limit_mb: limit.megabytes(),
                actual: self.declared_size(),
            });
        }
        if self.content_type != PDF_CONTENT_TYPE {
            return Err(UploadError::UnsupportedType { content_type: self.content_type.clone() });
        }
        Ok(())
    }
}
