use serde::Serialize;
use time::OffsetDateTime;

/// One stored document plus its metadata; the atomic persistence unit.
///
/// Records are immutable once stored: there is no update path for the
/// payload or size. Replacing a document means delete + re-insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Globally unique, caller-generated identifier. Primary key.
    pub id: String,
    /// Original filename. Opaque, not guaranteed unique.
    pub name: String,
    /// Byte length of `payload`. [`Repository::insert`](crate::Repository::insert)
    /// refuses records where the two disagree.
    pub size: u64,
    /// MIME type as declared at upload time. Used for admission filtering
    /// only; the payload is never sniffed.
    pub content_type: String,
    /// Creation time, stamped once at upload.
    pub uploaded_at: OffsetDateTime,
    /// Populated lazily if a consumer ever reports it; not required for
    /// catalog correctness.
    pub page_count: Option<u32>,
    /// Raw document bytes.
    pub payload: Vec<u8>,
}

impl Record {
    /// The metadata-only view of this record.
    pub fn meta(&self) -> RecordMeta {
        RecordMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            size: self.size,
            content_type: self.content_type.clone(),
            uploaded_at: self.uploaded_at,
            page_count: self.page_count,
        }
    }
}

/// Metadata view of a [`Record`], without the payload.
///
/// This is what listing returns and what the catalog projection holds;
/// payloads are only ever materialized one at a time through
/// [`Repository::get`](crate::Repository::get).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordMeta {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

/// Aggregate usage counters for the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of records currently stored.
    pub records: u64,
    /// Sum of all payload sizes in bytes.
    pub payload_bytes: u64,
}
