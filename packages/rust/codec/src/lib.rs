//! Canonical CSV form for query results.
//!
//! Converts ordered records into CSV text with uniform quoting (see
//! [`encode::encode_records`]) and wraps the result in a [`CsvDocument`]
//! carrying the derived header line, byte size, and content hash — the
//! inputs the overflow offload decision works from.

mod encode;

use sha2::{Digest, Sha256};
use tracing::debug;

use sheetcast_shared::Record;

pub use encode::{Schema, encode_records, encode_table};

// ---------------------------------------------------------------------------
// CsvDocument
// ---------------------------------------------------------------------------

/// The canonical encoded text form of one query result.
///
/// Created once per transaction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    /// The full CSV text.
    pub text: String,
    /// First line of `text` ("" when `text` is empty).
    pub header_line: String,
    /// UTF-8 byte length of `text`.
    pub byte_size: usize,
    /// SHA-256 hex digest of `text`, for logging and traceability.
    pub content_hash: String,
}

impl CsvDocument {
    /// Wrap already-encoded CSV text, deriving the header line, byte size,
    /// and content hash.
    pub fn new(text: String) -> Self {
        let header_line = text.lines().next().unwrap_or_default().to_string();
        let byte_size = text.len();
        let content_hash = {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            format!("{:x}", hasher.finalize())
        };

        Self {
            text,
            header_line,
            byte_size,
            content_hash,
        }
    }

    /// Encode records (already truncated by the caller) into a document.
    pub fn from_records(records: &[Record]) -> Self {
        let doc = Self::new(encode_records(records));
        debug!(
            rows = records.len(),
            bytes = doc.byte_size,
            hash = %doc.content_hash,
            "encoded csv document"
        );
        doc
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
