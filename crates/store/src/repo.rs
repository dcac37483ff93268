//! Record repository: insert, fetch, list, delete.
//!
//! Metadata and payload are stored in separate tables but treated as one
//! unit: an insert writes both rows inside a single transaction, and the
//! `ON DELETE CASCADE` foreign key guarantees a payload can never outlive
//! its metadata. A reader therefore never observes half a record.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{FullRow, MetaRow, Record, RecordMeta, StorageStats};
use exn::ResultExt;
use sqlx::SqlitePool;

/// Repository for document [`Record`]s.
///
/// Records are write-once: there is no update path for payload or size.
/// Replacing a document means deleting the old record and inserting a new
/// one under a fresh id.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert a new record.
    ///
    /// The metadata row and the payload blob are committed in the same
    /// transaction; a concurrent reader sees either the whole record or
    /// nothing.
    ///
    /// Returns [`ErrorKind::InvalidData`] if `record.size` disagrees with
    /// the payload length, [`ErrorKind::DuplicateKey`] if the id already
    /// exists (inserts never overwrite), and [`ErrorKind::QuotaExceeded`]
    /// if the host refuses the write for lack of space.
    pub async fn insert(&self, record: &Record) -> Result<()> {
        if record.size != record.payload.len() as u64 {
            exn::bail!(ErrorKind::InvalidData("size does not match payload length"));
        }
        let row = MetaRow::try_from(record)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        if let Err(err) = sqlx::query(include_str!("../queries/insert_record.sql"))
            .bind(row.id)
            .bind(row.name)
            .bind(row.size)
            .bind(row.content_type)
            .bind(row.uploaded_at)
            .bind(row.page_count)
            .execute(&mut *tx)
            .await
        {
            let kind = ErrorKind::classify_write(&record.id, &err);
            return Err(err).or_raise(|| kind);
        }
        if let Err(err) = sqlx::query(include_str!("../queries/insert_payload.sql"))
            .bind(&record.id)
            .bind(record.payload.as_slice())
            .execute(&mut *tx)
            .await
        {
            let kind = ErrorKind::classify_write(&record.id, &err);
            return Err(err).or_raise(|| kind);
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Fetch a full record (payload included) by id.
    ///
    /// A missing id is `Ok(None)`, not an error.
    pub async fn get(&self, id: impl AsRef<str>) -> Result<Option<Record>> {
        let row: Option<FullRow> = sqlx::query_as(include_str!("../queries/get_record.sql"))
            .bind(id.as_ref())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Record::try_from).transpose()
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List metadata for every record.
    ///
    /// Payloads are deliberately left behind; fetch them one at a time with
    /// [`get`](Self::get). Order is unspecified at this layer - callers
    /// that care about ordering sort for themselves.
    pub async fn list(&self) -> Result<Vec<RecordMeta>> {
        let rows: Vec<MetaRow> = sqlx::query_as(include_str!("../queries/list_records.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(RecordMeta::try_from).collect()
    }

    /// Aggregate record count and payload byte total.
    ///
    /// Useful for storage-usage diagnostics without touching any blobs.
    pub async fn stats(&self) -> Result<StorageStats> {
        let (records, payload_bytes): (i64, i64) = sqlx::query_as(include_str!("../queries/stats.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(StorageStats {
            records: u64::try_from(records).or_raise(|| ErrorKind::InvalidData("record count"))?,
            payload_bytes: u64::try_from(payload_bytes)
                .or_raise(|| ErrorKind::InvalidData("payload byte total"))?,
        })
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete a record by id; the cascade takes the payload row with it.
    ///
    /// Deleting an id that does not exist is a successful no-op.
    pub async fn delete(&self, id: impl AsRef<str>) -> Result<()> {
        sqlx::query(include_str!("../queries/delete_record.sql"))
            .bind(id.as_ref())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Remove every record. Provided for reset and test scenarios.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query(include_str!("../queries/clear_records.sql"))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}
