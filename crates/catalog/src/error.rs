//! Catalog Error Types
//!
//! Unlike the store crate there is no `Exn` here: every failure a caller can
//! see is an expected, user-facing outcome (an admission rejection or an
//! upload that could not be persisted), returned by value. Engine errors
//! never propagate past the catalog boundary - they are logged and mapped
//! onto the nearest variant below.

use derive_more::{Display, Error};
use shelf_store::error::ErrorKind as StoreErrorKind;

use crate::limit::MIB;

/// Why an upload was refused. The `Display` text is suitable for showing
/// to the user as-is.
#[derive(Debug, Display, Error)]
pub enum UploadError {
    /// The document is larger than the selected size limit.
    #[display("File size exceeds {}MB limit. Current size: {:.2}MB", limit_mb, *actual as f64 / MIB as f64)]
    SizeLimitExceeded {
        limit_mb: u64,
        /// Actual size of the rejected document, in bytes.
        actual: u64,
    },
    /// The declared MIME type is not `application/pdf`.
    #[display("Only PDF files are supported")]
    UnsupportedType {
        #[error(not(source))]
        content_type: String,
    },
    /// The store refused the write for lack of space.
    #[display("Not enough storage space to save this file")]
    QuotaExceeded,
    /// Anything else that went wrong while persisting.
    #[display("Failed to upload the file. Please try again.")]
    Storage,
}

impl UploadError {
    /// Downgrade an engine failure to a user-facing upload error.
    ///
    /// A duplicate key means the generated id collided, which is a bug in
    /// this crate rather than anything the user did, so it is logged loudly
    /// and reported as a generic failure.
    pub(crate) fn from_store(err: shelf_store::error::Error) -> Self {
        match &*err {
            StoreErrorKind::QuotaExceeded => Self::QuotaExceeded,
            StoreErrorKind::DuplicateKey(id) => {
                tracing::error!(%id, "generated record id collided; this should never happen");
                Self::Storage
            },
            _ => {
                tracing::error!(error = ?err, "upload failed in the persistence engine");
                Self::Storage
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit_message_names_both_sizes() {
        let err = UploadError::SizeLimitExceeded { limit_mb: 3, actual: 4 * MIB };
        assert_eq!(err.to_string(), "File size exceeds 3MB limit. Current size: 4.00MB");
    }

    #[test]
    fn test_size_limit_message_rounds_to_two_decimals() {
        let err = UploadError::SizeLimitExceeded { limit_mb: 5, actual: 5 * MIB + 1_048_576 / 3 };
        assert_eq!(err.to_string(), "File size exceeds 5MB limit. Current size: 5.33MB");
    }

    #[test]
    fn test_unsupported_type_message() {
        let err = UploadError::UnsupportedType { content_type: "image/png".to_string() };
        assert_eq!(err.to_string(), "Only PDF files are supported");
    }
}
