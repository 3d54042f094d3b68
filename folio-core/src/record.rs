//! Record identity and the schema contract shared by all content records.
//!
//! A record lives in two shapes: the nested application state (what the
//! editing UI mutates) and a flattened row (what the remote collection
//! stores). [`RecordSchema`] describes both shapes for one record type
//! plus its compiled-in defaults, which lets the reconciliation engine
//! treat every content area uniformly.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::store::StoreError;

/// Unique identifier for a persisted record.
///
/// Assigned by the remote store on first insert. Once assigned it is
/// immutable and must be carried on every subsequent commit so the store
/// updates the existing row instead of creating a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new random record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from a string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contract between one record type and its remote collection.
///
/// Implementations provide the collection name, the compiled-in defaults
/// used for first-time seeding, and the conversions between the nested
/// record shape and the flattened row shape.
pub trait RecordSchema: Clone + Send + Sync + 'static {
    /// Flattened row shape stored in the remote collection.
    type Row: Serialize + DeserializeOwned + Send;

    /// Name of the remote collection this record persists to.
    const COLLECTION: &'static str;

    /// Compiled-in default values.
    fn defaults() -> Self;

    /// Store-assigned identifier, absent until first persisted.
    fn id(&self) -> Option<RecordId>;

    /// Adopt a store-assigned identifier.
    fn assign_id(&mut self, id: RecordId);

    /// Stamp the record's last-modified timestamp (ms since epoch).
    fn touch(&mut self, now_ms: u64);

    /// Flatten into the remote row shape.
    fn to_row(&self) -> Self::Row;

    /// Rebuild the nested record shape from a row.
    fn from_row(row: Self::Row) -> Self;
}

/// Flatten a record into a JSON row payload for the remote store.
///
/// # Errors
///
/// Returns [`StoreError::RowDecode`] if the row shape fails to serialize.
pub fn flatten<T: RecordSchema>(record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record.to_row()).map_err(|e| StoreError::RowDecode(e.to_string()))
}

/// Rebuild a record from a remote row, filling gaps from the defaults.
///
/// The remote row is overlaid on the flattened defaults at the JSON
/// level: columns that are absent or `null` remotely keep their default
/// value. Older remote rows that predate newer columns therefore load
/// without error.
///
/// # Errors
///
/// Returns [`StoreError::RowDecode`] if the remote payload is not a JSON
/// object or the merged row does not match the expected shape.
pub fn unflatten<T: RecordSchema>(remote: &Value) -> Result<T, StoreError> {
    let mut merged = serde_json::to_value(T::defaults().to_row())
        .map_err(|e| StoreError::RowDecode(e.to_string()))?;

    let (Some(base), Some(row)) = (merged.as_object_mut(), remote.as_object()) else {
        return Err(StoreError::RowDecode(format!(
            "expected a JSON object row in '{}'",
            T::COLLECTION
        )));
    };
    for (column, value) in row {
        if !value.is_null() {
            base.insert(column.clone(), value.clone());
        }
    }

    let row: T::Row =
        serde_json::from_value(merged).map_err(|e| StoreError::RowDecode(e.to_string()))?;
    Ok(T::from_row(row))
}

/// Extract the store-assigned identifier from a stored row, if any.
#[must_use]
pub fn row_id(row: &Value) -> Option<RecordId> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| RecordId::parse(s).ok())
}

/// Current Unix timestamp in milliseconds.
#[must_use]
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
