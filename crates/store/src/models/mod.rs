mod record;
mod row;

pub use self::record::{Record, RecordMeta, StorageStats};
pub(crate) use self::row::{FullRow, MetaRow};
