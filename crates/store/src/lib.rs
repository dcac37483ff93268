//! SQLite persistence engine for document records.
//!
//! This crate owns the durable half of the document library: a versioned
//! SQLite database holding one row of metadata plus one payload blob per
//! document. The database IS the source of truth - the in-memory catalog
//! projection maintained by `shelf-catalog` is derived from it and can be
//! rebuilt at any time with [`Repository::list`].
//!
//! # Architecture
//! - **Records**: document metadata (name, size, content type, upload
//!   timestamp, optional page count), keyed by a caller-generated unique id.
//! - **Payloads**: the raw document bytes, one blob per record, written in
//!   the same transaction as the metadata so neither is ever visible
//!   without the other.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::{Record, RecordMeta, StorageStats};
pub use crate::repo::Repository;
