//! Catalog service for the document library.
//!
//! The sole entry point presentation code talks to. Wraps the persistence
//! engine from `shelf-store` with the domain rules: admission validation
//! (size limit, content type), metadata stamping, newest-first ordering,
//! size-based filtering, and a full projection reload after every mutation.
//!
//! The projection held here is a cache, not a source of truth - every
//! mutating operation ends with a real `list()` snapshot taken after the
//! mutation committed, so the projection never drifts from durable state.

mod catalog;
pub mod error;
mod limit;
mod upload;

pub use crate::catalog::Catalog;
pub use crate::limit::SizeLimit;
pub use crate::upload::UploadRequest;
