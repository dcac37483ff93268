//! The catalog service: admission, projection, and the read path.

use crate::error::UploadError;
use crate::limit::SizeLimit;
use crate::upload::UploadRequest;
use shelf_store::{Database, Record, RecordMeta, Repository};
use std::path::Path;
use time::OffsetDateTime;
use uuid::Uuid;

/// The catalog of stored documents.
///
/// Owns an injected [`Database`] with an explicit lifecycle (no global
/// handle, so tests can run any number of isolated instances) and an
/// in-memory projection of record metadata, sorted newest-first.
///
/// None of the public operations here return an engine error: mutations
/// report a result value, the read path degrades to an absent value, and
/// a failed projection load parks the catalog in a recoverable error state.
#[derive(Debug)]
pub struct Catalog {
    db: Database,
    repo: Repository,
    projection: Vec<RecordMeta>,
    loading: bool,
    error: Option<String>,
}

impl Catalog {
    /// Wrap an already-connected database. The catalog is empty and marked
    /// as loading until the first [`refresh`](Self::refresh).
    pub fn new(db: Database) -> Self {
        let repo = Repository::from(&db);
        Self { db, repo, projection: Vec::new(), loading: true, error: None }
    }

    /// Connect to (creating if absent) the store at `path` and load the
    /// catalog. Failure to open or migrate the database is fatal and
    /// surfaced to the caller; failure to *list* is not - it leaves the
    /// catalog in its recoverable error state instead.
    pub async fn open(path: impl AsRef<Path>) -> shelf_store::error::Result<Self> {
        let db = Database::connect(path).await?;
        let mut catalog = Self::new(db);
        catalog.refresh().await;
        Ok(catalog)
    }

    /// Reload the projection from durable state.
    ///
    /// On success the projection is a sorted (upload time descending)
    /// snapshot taken after any prior mutation committed. On failure the
    /// catalog empties and the error flag stays set until a retry succeeds.
    pub async fn refresh(&mut self) {
        self.loading = true;
        match self.repo.list().await {
            Ok(mut records) => {
                records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
                self.projection = records;
                self.error = None;
            },
            Err(err) => {
                tracing::error!(error = ?err, "failed to load the catalog projection");
                self.projection.clear();
                self.error = Some(err.to_string());
            },
        }
        self.loading = false;
    }

    /// Admit and persist a candidate document.
    ///
    /// Admission checks run in order (size limit, then content type); a
    /// rejection is returned before anything touches storage. On success
    /// the projection is reloaded so the new record is visible to the next
    /// read. Engine failures are downgraded to an [`UploadError`] - this
    /// method never panics or leaks an engine error.
    pub async fn upload(&mut self, request: UploadRequest, limit: SizeLimit) -> Result<(), UploadError> {
        request.admit(limit)?;
        let record = Record {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            size: request.bytes.len() as u64,
            content_type: request.content_type,
            uploaded_at: OffsetDateTime::now_utc(),
            page_count: None,
            payload: request.bytes,
        };
        self.repo.insert(&record).await.map_err(UploadError::from_store)?;
        self.refresh().await;
        Ok(())
    }

    /// Fetch a single document's bytes for hand-off to a viewer.
    ///
    /// Returns `None` on a miss *and* on any engine error: the viewer shows
    /// the same "unavailable" state either way, so the distinction is only
    /// worth a log line. Never mutates catalog state.
    pub async fn fetch_payload(&self, id: impl AsRef<str>) -> Option<Vec<u8>> {
        let id = id.as_ref();
        match self.repo.get(id).await {
            Ok(record) => record.map(|record| record.payload),
            Err(err) => {
                tracing::warn!(id, error = ?err, "payload fetch failed; reporting as unavailable");
                None
            },
        }
    }

    /// Delete a document and reload the projection.
    ///
    /// Deleting an id that no longer exists still counts as success (the
    /// desired end state holds). Returns `false` only when the engine
    /// refused the delete, leaving the projection unchanged.
    pub async fn remove(&mut self, id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        match self.repo.delete(id).await {
            Ok(()) => {
                self.refresh().await;
                true
            },
            Err(err) => {
                tracing::warn!(id, error = ?err, "failed to delete record");
                false
            },
        }
    }

    /// Filter the current projection down to documents within `limit`.
    ///
    /// Pure and synchronous: operates on the in-memory projection only, so
    /// it can be called repeatedly with different limits without touching
    /// storage. The bound is inclusive.
    pub fn filter_by_size(&self, limit: SizeLimit) -> Vec<RecordMeta> {
        self.projection.iter().filter(|record| record.size <= limit.bytes()).cloned().collect()
    }

    /// The current projection: record metadata, newest upload first.
    pub fn records(&self) -> &[RecordMeta] {
        &self.projection
    }

    /// Whether a projection load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The last load failure, if the projection is currently unusable.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Close the underlying database. The catalog must not be used after.
    pub async fn close(self) {
        self.db.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limit::MIB;

    async fn make_catalog() -> Catalog {
        let db = Database::connect_in_memory().await.unwrap();
        let mut catalog = Catalog::new(db);
        catalog.refresh().await;
        catalog
    }

    fn pdf_of_size(name: &str, size: usize) -> UploadRequest {
        UploadRequest::new(name, "application/pdf", vec![0u8; size])
    }

    #[tokio::test]
    async fn test_fresh_catalog_is_empty_and_loaded() {
        let catalog = make_catalog().await;
        assert!(catalog.records().is_empty());
        assert!(!catalog.is_loading());
        assert!(catalog.error().is_none());
    }

    #[tokio::test]
    async fn test_upload_appears_in_projection_newest_first() {
        let mut catalog = make_catalog().await;
        catalog.upload(pdf_of_size("first.pdf", 10), SizeLimit::Mb3).await.unwrap();
        catalog.upload(pdf_of_size("second.pdf", 10), SizeLimit::Mb3).await.unwrap();
        let names: Vec<&str> = catalog.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["second.pdf", "first.pdf"]);
    }

    #[tokio::test]
    async fn test_projection_orders_by_upload_time_descending() {
        // Seed through the repository with explicit timestamps so the
        // ordering under test is unambiguous.
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        for (id, timestamp) in [
            ("middle", time::macros::datetime!(2025-08-02 12:00 UTC)),
            ("newest", time::macros::datetime!(2025-08-03 12:00 UTC)),
            ("oldest", time::macros::datetime!(2025-08-01 12:00 UTC)),
        ] {
            let payload = b"%PDF".to_vec();
            repo.insert(&Record {
                id: id.to_string(),
                name: format!("{id}.pdf"),
                size: payload.len() as u64,
                content_type: "application/pdf".to_string(),
                uploaded_at: timestamp,
                page_count: None,
                payload,
            })
            .await
            .unwrap();
        }
        let mut catalog = Catalog::new(db);
        catalog.refresh().await;
        let ids: Vec<&str> = catalog.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_rejected_upload_leaves_projection_unchanged() {
        let mut catalog = make_catalog().await;
        catalog.upload(pdf_of_size("kept.pdf", 10), SizeLimit::Mb3).await.unwrap();
        let err = catalog
            .upload(UploadRequest::new("nope.png", "image/png", vec![0u8; 10]), SizeLimit::Mb3)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
        assert_eq!(catalog.records().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_payload_round_trip() {
        let mut catalog = make_catalog().await;
        let bytes: Vec<u8> = (0..=255).cycle().take(4096).map(|b| b as u8).collect();
        catalog
            .upload(UploadRequest::new("doc.pdf", "application/pdf", bytes.clone()), SizeLimit::Mb3)
            .await
            .unwrap();
        let id = catalog.records()[0].id.clone();
        assert_eq!(catalog.fetch_payload(&id).await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_fetch_payload_miss_is_none() {
        let catalog = make_catalog().await;
        assert!(catalog.fetch_payload("no-such-id").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_payload_does_not_mutate_projection() {
        let mut catalog = make_catalog().await;
        catalog.upload(pdf_of_size("doc.pdf", 10), SizeLimit::Mb3).await.unwrap();
        let before = catalog.records().to_vec();
        let id = before[0].id.clone();
        catalog.fetch_payload(&id).await.unwrap();
        catalog.fetch_payload("missing").await;
        assert_eq!(catalog.records(), before.as_slice());
    }

    #[tokio::test]
    async fn test_remove_deletes_and_refreshes() {
        let mut catalog = make_catalog().await;
        catalog.upload(pdf_of_size("doc.pdf", 10), SizeLimit::Mb3).await.unwrap();
        let id = catalog.records()[0].id.clone();
        assert!(catalog.remove(&id).await);
        assert!(catalog.records().is_empty());
        assert!(catalog.fetch_payload(&id).await.is_none());
        // Removing the same id again is an idempotent success
        assert!(catalog.remove(&id).await);
    }

    #[tokio::test]
    async fn test_filter_by_size_is_inclusive_and_repeatable() {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        for (id, size) in [("small", 1_000_000_usize), ("large", 6_000_000)] {
            let payload = vec![0u8; size];
            repo.insert(&Record {
                id: id.to_string(),
                name: format!("{id}.pdf"),
                size: size as u64,
                content_type: "application/pdf".to_string(),
                uploaded_at: OffsetDateTime::now_utc(),
                page_count: None,
                payload,
            })
            .await
            .unwrap();
        }
        let mut catalog = Catalog::new(db);
        catalog.refresh().await;
        let filtered_five = catalog.filter_by_size(SizeLimit::Mb5);
        let under_five: Vec<&str> = filtered_five.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(under_five, vec!["small"]);
        // Repeat with a different limit without re-fetching
        let filtered_three = catalog.filter_by_size(SizeLimit::Mb3);
        let under_three: Vec<&str> = filtered_three.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(under_three, vec!["small"]);
        assert_eq!(catalog.records().len(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_sets_recoverable_error_state() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut catalog = Catalog::new(db.clone());
        db.close().await;
        catalog.refresh().await;
        assert!(catalog.records().is_empty());
        assert!(!catalog.is_loading());
        assert!(catalog.error().is_some());
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let mut catalog = make_catalog().await;

        // Upload a 2MB PDF under a 3MB limit
        catalog.upload(pdf_of_size("report.pdf", (2 * MIB) as usize), SizeLimit::Mb3).await.unwrap();
        assert_eq!(catalog.records().len(), 1);
        assert_eq!(catalog.records()[0].name, "report.pdf");
        assert_eq!(catalog.filter_by_size(SizeLimit::Mb3).len(), 1);
        assert_eq!(catalog.filter_by_size(SizeLimit::Mb5).len(), 1);

        // A 4MB upload against the same limit is refused with both sizes named
        let err = catalog
            .upload(pdf_of_size("too-big.pdf", (4 * MIB) as usize), SizeLimit::Mb3)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("3MB"), "{message}");
        assert!(message.contains("4.00MB"), "{message}");
        assert_eq!(catalog.records().len(), 1);

        // Delete the first item; the projection empties
        let id = catalog.records()[0].id.clone();
        assert!(catalog.remove(&id).await);
        assert!(catalog.records().is_empty());
    }
}
