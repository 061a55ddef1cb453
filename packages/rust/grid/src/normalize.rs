//! CSV-text to bounded grid normalization.
//!
//! `normalize` accepts whatever text arrives on the sheet channel — a full
//! CSV document, the upstream error marker, or garbage — and always produces
//! a grid within the fixed row/column bounds. Parse problems degrade to the
//! blank default grid; they are never surfaced as errors.

use tracing::{debug, warn};

use crate::{MAX_COLS, MAX_ROWS, MIN_COLS, MIN_ROWS};

// ---------------------------------------------------------------------------
// GridState
// ---------------------------------------------------------------------------

/// One grid row: a 1-based row number (the frozen, non-editable first
/// column of the UI) plus the data cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub row_number: usize,
    pub cells: Vec<String>,
}

/// The bounded, editable in-memory table.
///
/// Invariants after normalization: `MIN_ROWS ≤ rows ≤ MAX_ROWS`; every row
/// has exactly `col_count` cells with `MIN_COLS ≤ col_count ≤ MAX_COLS`;
/// `truncated` is set whenever normalization discarded data beyond the
/// input's natural shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    rows: Vec<GridRow>,
    col_count: usize,
    truncated: bool,
}

impl GridState {
    /// The blank default grid produced for empty or unparsable input.
    pub fn blank() -> Self {
        let rows = (1..=MIN_ROWS)
            .map(|row_number| GridRow {
                row_number,
                cells: vec![String::new(); MIN_COLS],
            })
            .collect();
        Self {
            rows,
            col_count: MIN_COLS,
            truncated: false,
        }
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data columns (the frozen row-number column is not counted).
    pub fn col_count(&self) -> usize {
        self.col_count
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Cell value at (row, data column), if in range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.cells.get(col).map(String::as_str)
    }

    /// Labels for the data columns, in order (`A..Z, AA, …`).
    pub fn column_labels(&self) -> Vec<String> {
        (0..self.col_count).map(crate::column_label).collect()
    }

    pub(crate) fn set_cell(&mut self, row: usize, col: usize, value: String) {
        self.rows[row].cells[col] = value;
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize arbitrary CSV text into a bounded grid.
///
/// Rows beyond `MAX_ROWS` are dropped. The grid width is the first row's
/// natural width clamped to `[MIN_COLS, MAX_COLS]`; every row is padded or
/// cut to that width. The `truncated` flag reflects dropped rows or a first
/// row wider than `MAX_COLS` — a *later* row wider than the first is cut
/// without being flagged.
pub fn normalize(text: &str) -> GridState {
    let parsed = match parse_csv(text) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "csv parse failed, falling back to blank grid");
            Vec::new()
        }
    };

    if parsed.is_empty() {
        return GridState::blank();
    }

    let total_rows = parsed.len();
    let rows_truncated = total_rows > MAX_ROWS;
    let cols_truncated = parsed[0].len() > MAX_COLS;
    let width = parsed[0].len().clamp(MIN_COLS, MAX_COLS);

    let mut rows: Vec<GridRow> = parsed
        .into_iter()
        .take(MAX_ROWS)
        .enumerate()
        .map(|(i, mut cells)| {
            cells.resize(width, String::new());
            GridRow {
                row_number: i + 1,
                cells,
            }
        })
        .collect();

    while rows.len() < MIN_ROWS {
        rows.push(GridRow {
            row_number: rows.len() + 1,
            cells: vec![String::new(); width],
        });
    }

    debug!(
        input_rows = total_rows,
        rows = rows.len(),
        cols = width,
        truncated = rows_truncated || cols_truncated,
        "normalized grid"
    );

    GridState {
        rows,
        col_count: width,
        truncated: rows_truncated || cols_truncated,
    }
}

/// Parse standard-dialect CSV (quoted fields, embedded newlines inside
/// quotes) into rows of cells, skipping fully empty lines.
fn parse_csv(text: &str) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        // A blank line surfaces as a single empty field in flexible mode.
        if record.len() <= 1 && record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn empty_input_yields_blank_default_grid() {
        let grid = normalize("");
        assert_eq!(grid.row_count(), MIN_ROWS);
        assert_eq!(grid.col_count(), MIN_COLS);
        assert!(!grid.truncated());
        assert!(
            grid.rows()
                .iter()
                .all(|r| r.cells.iter().all(String::is_empty))
        );
    }

    #[test]
    fn small_table_is_padded_to_bounds() {
        let grid = normalize("\"name\",\"age\"\n\"Alice\",\"30\"");
        assert_eq!(grid.row_count(), MIN_ROWS);
        assert_eq!(grid.col_count(), MIN_COLS);
        assert_eq!(grid.cell(0, 0), Some("name"));
        assert_eq!(grid.cell(1, 1), Some("30"));
        assert_eq!(grid.cell(1, 2), Some(""));
        assert!(!grid.truncated());
    }

    #[test]
    fn rows_beyond_max_are_dropped_and_flagged() {
        let text = (0..1500)
            .map(|i| format!("\"row{i}\""))
            .collect::<Vec<_>>()
            .join("\n");
        let grid = normalize(&text);
        assert_eq!(grid.row_count(), MAX_ROWS);
        assert!(grid.truncated());
        assert_eq!(grid.cell(999, 0), Some("row999"));
    }

    #[test]
    fn exactly_max_rows_is_not_flagged() {
        let text = (0..MAX_ROWS)
            .map(|i| format!("\"row{i}\""))
            .collect::<Vec<_>>()
            .join("\n");
        let grid = normalize(&text);
        assert_eq!(grid.row_count(), MAX_ROWS);
        assert!(!grid.truncated());
    }

    #[test]
    fn wide_first_row_is_cut_and_flagged() {
        let wide = (0..60)
            .map(|i| format!("\"c{i}\""))
            .collect::<Vec<_>>()
            .join(",");
        let grid = normalize(&wide);
        assert_eq!(grid.col_count(), MAX_COLS);
        assert!(grid.truncated());
        assert_eq!(grid.cell(0, 49), Some("c49"));
    }

    #[test]
    fn natural_width_between_bounds_is_kept() {
        let row = (0..30)
            .map(|i| format!("\"c{i}\""))
            .collect::<Vec<_>>()
            .join(",");
        let grid = normalize(&row);
        assert_eq!(grid.col_count(), 30);
        assert!(!grid.truncated());
    }

    #[test]
    fn later_wider_row_is_cut_without_flag() {
        // First row defines the width; the wider second row is trimmed
        // silently (truncation detection only inspects the first row).
        let text = "\"a\",\"b\"\n".to_string()
            + &(0..40)
                .map(|i| format!("\"x{i}\""))
                .collect::<Vec<_>>()
                .join(",");
        let grid = normalize(&text);
        assert_eq!(grid.col_count(), MIN_COLS);
        assert!(!grid.truncated());
        assert_eq!(grid.cell(1, 25), Some("x25"));
        assert_eq!(grid.cell(1, 26), None);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let grid = normalize("\"a\"\n\n\n\"b\"\n");
        assert_eq!(grid.cell(0, 0), Some("a"));
        assert_eq!(grid.cell(1, 0), Some("b"));
        assert_eq!(grid.cell(2, 0), Some(""));
    }

    #[test]
    fn quoted_newline_stays_in_one_cell() {
        let grid = normalize("\"line1\nline2\",\"b\"");
        assert_eq!(grid.cell(0, 0), Some("line1\nline2"));
        assert_eq!(grid.cell(0, 1), Some("b"));
    }

    #[test]
    fn doubled_quotes_decode() {
        let grid = normalize("\"say \"\"hi\"\"\"");
        assert_eq!(grid.cell(0, 0), Some("say \"hi\""));
    }

    #[test]
    fn error_marker_lands_in_first_cell() {
        let grid = normalize(sheetcast_shared::CSV_ERROR_MARKER);
        assert_eq!(grid.cell(0, 0), Some(sheetcast_shared::CSV_ERROR_MARKER));
        assert_eq!(grid.row_count(), MIN_ROWS);
        assert!(!grid.truncated());
    }

    #[test]
    fn malformed_quoting_never_panics_and_stays_bounded() {
        for input in ["\"unclosed", "a\",b", "\"\"\"", ",,,\"", "\u{0}\"x"] {
            let grid = normalize(input);
            assert!(grid.row_count() >= MIN_ROWS && grid.row_count() <= MAX_ROWS);
            assert!(grid.col_count() >= MIN_COLS && grid.col_count() <= MAX_COLS);
        }
    }

    #[test]
    fn row_numbers_are_one_based_and_consecutive() {
        let grid = normalize("\"a\"\n\"b\"");
        let numbers: Vec<usize> = grid.rows().iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, (1..=MIN_ROWS).collect::<Vec<_>>());
    }

    #[test]
    fn column_labels_follow_position() {
        let grid = normalize("");
        let labels = grid.column_labels();
        assert_eq!(labels.len(), MIN_COLS);
        assert_eq!(labels[0], "A");
        assert_eq!(labels[25], "Z");
    }

    proptest! {
        #[test]
        fn bounds_hold_for_arbitrary_text(text in ".{0,400}") {
            let grid = normalize(&text);
            prop_assert!(grid.row_count() >= MIN_ROWS);
            prop_assert!(grid.row_count() <= MAX_ROWS);
            prop_assert!(grid.col_count() >= MIN_COLS);
            prop_assert!(grid.col_count() <= MAX_COLS);
            prop_assert!(grid.rows().iter().all(|r| r.cells.len() == grid.col_count()));
        }
    }
}
