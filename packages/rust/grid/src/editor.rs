//! Live grid editing and CSV round-tripping.
//!
//! The editor owns one [`GridState`] at a time. Every accepted edit mutates
//! exactly one data cell, re-encodes the whole table to canonical CSV, and
//! hands the fresh text to the save sink — edits never patch the original
//! CSV text.

use tracing::debug;

use sheetcast_shared::{Result, SheetcastError};

use crate::normalize::{GridState, normalize};

// ---------------------------------------------------------------------------
// SaveSink
// ---------------------------------------------------------------------------

/// Receives the re-serialized CSV after each edit.
///
/// `is_current_version` tells the caller whether the edited grid is the
/// latest version of the artifact; edits against older versions are still
/// serialized and delivered — what to do with them is the caller's policy.
pub trait SaveSink: Send + Sync {
    fn save(&self, csv: &str, is_current_version: bool);
}

/// No-op sink for headless/test usage.
pub struct NullSave;

impl SaveSink for NullSave {
    fn save(&self, _csv: &str, _is_current_version: bool) {}
}

// ---------------------------------------------------------------------------
// GridEditor
// ---------------------------------------------------------------------------

/// Owns the live grid state for one loaded artifact.
///
/// Created when an artifact is loaded into the editor, discarded when the
/// editor unmounts or a new artifact replaces it.
#[derive(Debug)]
pub struct GridEditor {
    state: GridState,
    is_current_version: bool,
}

impl GridEditor {
    /// Normalize `content` and take ownership of the resulting grid.
    pub fn load(content: &str, is_current_version: bool) -> Self {
        Self {
            state: normalize(content),
            is_current_version,
        }
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn is_current_version(&self) -> bool {
        self.is_current_version
    }

    /// Update the latest-version flag (version switches are driven by the
    /// host, not by edits).
    pub fn set_current_version(&mut self, is_current_version: bool) {
        self.is_current_version = is_current_version;
    }

    /// Apply a single-cell edit at (row, data column) and push the
    /// re-serialized CSV to `sink`.
    ///
    /// The frozen row-number column is not addressable here — `col` indexes
    /// data columns only. Out-of-range coordinates are validation errors and
    /// leave the grid untouched.
    pub fn edit(
        &mut self,
        row: usize,
        col: usize,
        value: impl Into<String>,
        sink: &dyn SaveSink,
    ) -> Result<()> {
        if row >= self.state.row_count() {
            return Err(SheetcastError::validation(format!(
                "row {row} out of range (grid has {} rows)",
                self.state.row_count()
            )));
        }
        if col >= self.state.col_count() {
            return Err(SheetcastError::validation(format!(
                "column {col} out of range (grid has {} columns)",
                self.state.col_count()
            )));
        }

        self.state.set_cell(row, col, value.into());
        let csv = serialize(&self.state);
        debug!(row, col, bytes = csv.len(), "cell edited, grid re-serialized");
        sink.save(&csv, self.is_current_version);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Re-encode the grid's data cells as canonical CSV.
///
/// The synthetic row-number column is dropped; what remains is the
/// rectangular table, re-run through the CSV encoder. Cannot fail.
pub fn serialize(state: &GridState) -> String {
    let rows: Vec<Vec<String>> = state.rows().iter().map(|r| r.cells.clone()).collect();
    sheetcast_codec::encode_table(&rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
