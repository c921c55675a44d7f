//! # Decoded CDC log rows and their identifiers.
//!
//! A CDC log is an append-only record of row-level mutations. Each logged
//! mutation is surfaced to the runtime as a [`RawChange`]: a thin, read-only
//! view over one decoded log row. The runtime itself never decodes rows and
//! never holds on to a change beyond the consume call — decoding belongs to
//! the reader implementation plugged in via
//! [`ReaderFactory`](crate::source::ReaderFactory).
//!
//! ## Identity and ordering
//! Every change carries a [`ChangeId`]: the [`StreamId`] it belongs to plus a
//! time-derived, monotonically increasing [`ChangeTime`]. Within one stream,
//! `ChangeId` order is delivery order.
//!
//! ## Synthetic columns
//! The log encodes per-row metadata as synthetic `cdc$*` columns:
//! - `cdc$operation` — the [`OperationKind`] tag (one byte)
//! - `cdc$ttl` — optional time-to-live in seconds
//! - `cdc$deleted_<column>` — per-column deletion marker
//!
//! [`RawChange`] provides default accessors for all three, so reader
//! implementations only supply [`id`](RawChange::id) and by-name
//! [`cell`](RawChange::cell) access.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Name of the synthetic column holding the operation tag.
pub const OPERATION_COLUMN: &str = "cdc$operation";

/// Name of the synthetic column holding the row TTL.
pub const TTL_COLUMN: &str = "cdc$ttl";

/// Prefix of the synthetic per-column deletion markers.
pub const DELETED_COLUMN_PREFIX: &str = "cdc$deleted_";

/// Opaque identity of one CDC stream.
///
/// The byte content is assigned by the source database; the runtime only
/// compares and displays it (lowercase hex).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamId(Vec<u8>);

impl StreamId {
    /// Creates a stream id from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw byte representation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Time-derived ordering token of one log entry within a stream.
///
/// Backed by a ULID: 48 bits of wall-clock milliseconds followed by entropy,
/// so tokens sort by creation time and remain unique within a millisecond.
/// Created by the decoding layer; the runtime only compares tokens and reads
/// their timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeTime(Ulid);

impl ChangeTime {
    /// Wraps an existing ULID.
    pub fn new(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Builds a token from a wall-clock millisecond timestamp and entropy.
    ///
    /// Intended for decoders translating source-native ordering tokens, and
    /// for deterministic fixtures.
    pub fn from_parts(timestamp_ms: u64, entropy: u128) -> Self {
        Self(Ulid::from_parts(timestamp_ms, entropy))
    }

    /// Returns the wall-clock instant this token was derived from.
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0.timestamp_ms() as i64).unwrap_or_default()
    }
}

impl fmt::Display for ChangeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Totally ordered identifier of a single log entry within a stream.
///
/// Orders first by stream, then by [`ChangeTime`] — so within one stream the
/// derived order is the delivery order. Immutable; produced by the decoding
/// layer, never by the runtime.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeId {
    stream: StreamId,
    time: ChangeTime,
}

impl ChangeId {
    /// Creates a change id from its parts.
    pub fn new(stream: StreamId, time: ChangeTime) -> Self {
        Self { stream, time }
    }

    /// Returns the stream this change belongs to.
    pub fn stream(&self) -> &StreamId {
        &self.stream
    }

    /// Returns the ordering token.
    pub fn time(&self) -> ChangeTime {
        self.time
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stream, self.time)
    }
}

/// Operation tag carried by every log row in `cdc$operation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// State of the row before the mutation.
    PreImage,
    /// Update of existing row cells.
    RowUpdate,
    /// Full row insert.
    RowInsert,
    /// Single row delete.
    RowDelete,
    /// Whole-partition delete.
    PartitionDelete,
    /// Left bound of a row range delete, bound included.
    RowRangeDeleteInclusiveLeft,
    /// Left bound of a row range delete, bound excluded.
    RowRangeDeleteExclusiveLeft,
    /// Right bound of a row range delete, bound included.
    RowRangeDeleteInclusiveRight,
    /// Right bound of a row range delete, bound excluded.
    RowRangeDeleteExclusiveRight,
    /// State of the row after the mutation.
    PostImage,
}

impl OperationKind {
    /// Parses the wire byte stored in `cdc$operation`.
    ///
    /// Returns `None` for bytes outside the known range instead of trusting
    /// the log blindly.
    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => OperationKind::PreImage,
            1 => OperationKind::RowUpdate,
            2 => OperationKind::RowInsert,
            3 => OperationKind::RowDelete,
            4 => OperationKind::PartitionDelete,
            5 => OperationKind::RowRangeDeleteInclusiveLeft,
            6 => OperationKind::RowRangeDeleteExclusiveLeft,
            7 => OperationKind::RowRangeDeleteInclusiveRight,
            8 => OperationKind::RowRangeDeleteExclusiveRight,
            9 => OperationKind::PostImage,
            _ => return None,
        })
    }

    /// Returns the wire byte for this operation.
    pub fn id(self) -> u8 {
        match self {
            OperationKind::PreImage => 0,
            OperationKind::RowUpdate => 1,
            OperationKind::RowInsert => 2,
            OperationKind::RowDelete => 3,
            OperationKind::PartitionDelete => 4,
            OperationKind::RowRangeDeleteInclusiveLeft => 5,
            OperationKind::RowRangeDeleteExclusiveLeft => 6,
            OperationKind::RowRangeDeleteInclusiveRight => 7,
            OperationKind::RowRangeDeleteExclusiveRight => 8,
            OperationKind::PostImage => 9,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            OperationKind::PreImage => "pre_image",
            OperationKind::RowUpdate => "row_update",
            OperationKind::RowInsert => "row_insert",
            OperationKind::RowDelete => "row_delete",
            OperationKind::PartitionDelete => "partition_delete",
            OperationKind::RowRangeDeleteInclusiveLeft => "row_range_delete_inclusive_left",
            OperationKind::RowRangeDeleteExclusiveLeft => "row_range_delete_exclusive_left",
            OperationKind::RowRangeDeleteInclusiveRight => "row_range_delete_inclusive_right",
            OperationKind::RowRangeDeleteExclusiveRight => "row_range_delete_exclusive_right",
            OperationKind::PostImage => "post_image",
        }
    }
}

/// One decoded cell value.
///
/// Covers the handful of primitive types the runtime itself needs (the
/// synthetic `cdc$*` columns) plus text/blob/timestamp for application
/// columns. Richer type mapping belongs to the decoding layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Explicit null.
    Null,
    Bool(bool),
    TinyInt(i8),
    BigInt(i64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Cell::TinyInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::BigInt(v) => Some(*v),
            Cell::TinyInt(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Cell::Blob(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

/// Read-only view over a single decoded CDC log row.
///
/// Implemented by the decoding layer behind a
/// [`ChangeReader`](crate::source::ChangeReader). The runtime passes the
/// change to the consumer exactly once per delivery and drops it afterwards.
///
/// Only [`id`](Self::id) and [`cell`](Self::cell) are required; the
/// `cdc$*` metadata accessors are derived.
pub trait RawChange: Send + Sync {
    /// Identifier of this log entry.
    fn id(&self) -> &ChangeId;

    /// By-name cell access. `None` when the column is absent from the row.
    fn cell(&self, column: &str) -> Option<&Cell>;

    /// True when the column is absent or holds an explicit null.
    fn is_null(&self, column: &str) -> bool {
        self.cell(column).is_none_or(Cell::is_null)
    }

    /// Operation tag parsed from `cdc$operation`.
    ///
    /// `None` when the column is missing, null, or carries an unknown byte.
    fn operation(&self) -> Option<OperationKind> {
        let byte = self.cell(OPERATION_COLUMN)?.as_i8()?;
        OperationKind::from_id(byte as u8)
    }

    /// Row time-to-live in seconds from `cdc$ttl`, if set.
    fn ttl(&self) -> Option<i64> {
        self.cell(TTL_COLUMN)?.as_i64()
    }

    /// True when the `cdc$deleted_<column>` marker is present and set.
    fn is_deleted(&self, column: &str) -> bool {
        self.cell(&format!("{DELETED_COLUMN_PREFIX}{column}"))
            .and_then(Cell::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct MapChange {
        id: ChangeId,
        cells: HashMap<String, Cell>,
    }

    impl MapChange {
        fn new(cells: Vec<(&str, Cell)>) -> Self {
            Self {
                id: ChangeId::new(StreamId::new([1u8, 2]), ChangeTime::from_parts(1_000, 0)),
                cells: cells
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            }
        }
    }

    impl RawChange for MapChange {
        fn id(&self) -> &ChangeId {
            &self.id
        }

        fn cell(&self, column: &str) -> Option<&Cell> {
            self.cells.get(column)
        }
    }

    #[test]
    fn change_ids_order_by_time_within_stream() {
        let stream = StreamId::new([7u8]);
        let a = ChangeId::new(stream.clone(), ChangeTime::from_parts(100, 0));
        let b = ChangeId::new(stream.clone(), ChangeTime::from_parts(100, 1));
        let c = ChangeId::new(stream, ChangeTime::from_parts(200, 0));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn change_time_exposes_wall_clock() {
        let t = ChangeTime::from_parts(86_400_000, 0);
        assert_eq!(t.timestamp().timestamp_millis(), 86_400_000);
    }

    #[test]
    fn operation_round_trips_through_wire_byte() {
        for id in 0u8..10 {
            let op = OperationKind::from_id(id).expect("known id");
            assert_eq!(op.id(), id);
        }
        assert_eq!(OperationKind::from_id(10), None);
        assert_eq!(OperationKind::from_id(255), None);
    }

    #[test]
    fn operation_read_from_synthetic_column() {
        let change = MapChange::new(vec![(OPERATION_COLUMN, Cell::TinyInt(2))]);
        assert_eq!(change.operation(), Some(OperationKind::RowInsert));

        let missing = MapChange::new(vec![]);
        assert_eq!(missing.operation(), None);

        let unknown = MapChange::new(vec![(OPERATION_COLUMN, Cell::TinyInt(42))]);
        assert_eq!(unknown.operation(), None);
    }

    #[test]
    fn ttl_absent_when_column_null() {
        let with_ttl = MapChange::new(vec![(TTL_COLUMN, Cell::BigInt(3600))]);
        assert_eq!(with_ttl.ttl(), Some(3600));

        let no_ttl = MapChange::new(vec![(TTL_COLUMN, Cell::Null)]);
        assert_eq!(no_ttl.ttl(), None);
    }

    #[test]
    fn deleted_marker_defaults_to_false() {
        let change = MapChange::new(vec![
            ("cdc$deleted_name", Cell::Bool(true)),
            ("cdc$deleted_age", Cell::Null),
        ]);
        assert!(change.is_deleted("name"));
        assert!(!change.is_deleted("age"));
        assert!(!change.is_deleted("missing"));
    }

    #[test]
    fn stream_id_displays_as_hex() {
        let id = StreamId::new([0x0a, 0xff, 0x01]);
        assert_eq!(id.to_string(), "0aff01");
    }
}
