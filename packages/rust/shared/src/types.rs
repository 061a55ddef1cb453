//! Core domain types for the Sheetcast artifact pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of records a query result contributes to one CSV document.
/// The transaction truncates before encoding; excess rows are silently dropped.
pub const MAX_RECORDS: usize = 1000;

/// Content sentinel substituted for the CSV payload when the upstream
/// query fails. Consumers render it as a one-cell grid.
pub const CSV_ERROR_MARKER: &str = "Error fetching or converting data.";

/// Fixed placeholder carried in place of the CSV text when the document was
/// offloaded to the object store. Directs the reader to `csv_url`.
pub const CSV_TOO_LARGE_PLACEHOLDER: &str =
    "CSV content too large to display inline. Fetch the full data from csvUrl.";

// ---------------------------------------------------------------------------
// ArtifactId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for artifact identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub Uuid);

impl ArtifactId {
    /// Generate a new time-sortable artifact identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The object store key for this artifact's CSV document.
    pub fn csv_key(&self) -> String {
        format!("{}.csv", self.0)
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArtifactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// The kind of artifact a transaction produces. Query results always render
/// as sheets today; the discriminator travels on the wire regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Sheet,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Sheet => write!(f, "sheet"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record / QueryResult
// ---------------------------------------------------------------------------

/// One row of query results: a field-name → value mapping with observable
/// insertion order (the first record's key order defines the column order
/// for the whole result).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub serde_json::Map<String, serde_json::Value>);

impl Record {
    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Cell value for `field`, degraded to a plain string: missing or null
    /// fields become empty, non-string JSON values become their JSON text.
    pub fn cell(&self, field: &str) -> String {
        match self.0.get(field) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Build a record from ordered string pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut map = serde_json::Map::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), serde_json::Value::String(v.to_string()));
        }
        Self(map)
    }
}

/// Ordered sequence of records returned by the external data source for one
/// prompt. Created per query, consumed once by the encoder, then discarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResult {
    pub records: Vec<Record>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for QueryResult {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

// ---------------------------------------------------------------------------
// ArtifactEnvelope
// ---------------------------------------------------------------------------

/// CSV payload block nested in the envelope for downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvData {
    /// Object store URL, or "" for inline delivery.
    pub url: String,
    /// First line of the encoded CSV ("" when the fetch failed).
    pub headers: String,
    /// The full CSV text, the error marker, or the too-large placeholder.
    pub csv_content: String,
}

/// The structured result of one query-to-artifact transaction, returned to
/// the caller alongside (and distinct from) the streamed events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactEnvelope {
    pub id: ArtifactId,
    pub title: String,
    pub kind: ArtifactKind,
    /// Human-readable summary for downstream reasoning.
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Flattened duplicates of the `csv_data` fields, consumed by clients
    /// that read the envelope without descending into the nested block.
    pub csv_url: String,
    pub csv_headers: String,
    pub csv_data: CsvData,
}
