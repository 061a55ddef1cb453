//! Bounded grid normalization and editing for sheet artifacts.
//!
//! The consuming side of the pipeline: [`normalize`] turns whatever CSV text
//! arrived on the sheet channel into a bounded, edit-safe [`GridState`];
//! [`GridEditor`] applies single-cell edits and round-trips the grid back to
//! canonical CSV through the encoder on every change.

mod editor;
mod labels;
mod normalize;

pub use editor::{GridEditor, NullSave, SaveSink, serialize};
pub use labels::column_label;
pub use normalize::{GridRow, GridState, normalize};

/// Minimum rows a normalized grid always presents.
pub const MIN_ROWS: usize = 50;
/// Hard cap on rows; input beyond this is dropped and flagged.
pub const MAX_ROWS: usize = 1000;
/// Minimum data columns a normalized grid always presents.
pub const MIN_COLS: usize = 26;
/// Hard cap on data columns.
pub const MAX_COLS: usize = 50;
