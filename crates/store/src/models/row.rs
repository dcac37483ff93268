use crate::error::{Error, ErrorKind};
use crate::models::{Record, RecordMeta};
use exn::ResultExt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Row shape of the `records` table (no payload).
#[derive(sqlx::FromRow)]
pub(crate) struct MetaRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) size: i64,
    pub(crate) content_type: String,
    // RFC 3339 text. Persisted as written so the value survives a round
    // trip byte-for-byte; ordering is done on the parsed value, not the
    // string (fractional seconds break lexicographic order).
    pub(crate) uploaded_at: String,
    pub(crate) page_count: Option<i64>,
}

impl TryFrom<&Record> for MetaRow {
    type Error = Error;
    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            size: i64::try_from(record.size).or_raise(|| ErrorKind::InvalidData("record size"))?,
            content_type: record.content_type.clone(),
            uploaded_at: record
                .uploaded_at
                .format(&Rfc3339)
                .or_raise(|| ErrorKind::InvalidData("upload timestamp"))?,
            page_count: record.page_count.map(i64::from),
        })
    }
}

impl TryFrom<MetaRow> for RecordMeta {
    type Error = Error;
    fn try_from(row: MetaRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            size: u64::try_from(row.size).or_raise(|| ErrorKind::InvalidData("record size"))?,
            content_type: row.content_type,
            uploaded_at: OffsetDateTime::parse(&row.uploaded_at, &Rfc3339)
                .or_raise(|| ErrorKind::InvalidData("upload timestamp"))?,
            page_count: row
                .page_count
                .map(|count| u32::try_from(count).or_raise(|| ErrorKind::InvalidData("page count")))
                .transpose()?,
        })
    }
}

/// Join of `records` and `payloads`, as returned by the single-record fetch.
#[derive(sqlx::FromRow)]
pub(crate) struct FullRow {
    #[sqlx(flatten)]
    pub(crate) meta: MetaRow,
    pub(crate) data: Vec<u8>,
}

impl TryFrom<FullRow> for Record {
    type Error = Error;
    fn try_from(row: FullRow) -> Result<Self, Self::Error> {
        let meta = RecordMeta::try_from(row.meta)?;
        Ok(Self {
            id: meta.id,
            name: meta.name,
            size: meta.size,
            content_type: meta.content_type,
            uploaded_at: meta.uploaded_at,
            page_count: meta.page_count,
            payload: row.data,
        })
    }
}
