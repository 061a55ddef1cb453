//! Artifact event emission and the query-to-artifact transaction.
//!
//! The producing side of the pipeline: [`run_query`] executes one
//! query-to-artifact transaction — announce events, fetch, encode, offload
//! decision, content event, finish event — and returns the
//! [`ArtifactEnvelope`](sheetcast_shared::ArtifactEnvelope) alongside the
//! streamed [`ArtifactEvent`]s.

mod events;
mod transaction;

pub use events::{ArtifactEvent, ChannelSink, EventSink, SilentSink};
pub use transaction::{ARTIFACT_SUMMARY, run_query};
