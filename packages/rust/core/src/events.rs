//! Typed artifact lifecycle events and the sinks that carry them.
//!
//! Events are fire-and-forget: nothing is awaited from the consumer, and
//! ordering is guaranteed purely by send order on a single sink.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tokio::sync::mpsc;

use sheetcast_shared::{ArtifactId, ArtifactKind};

// ---------------------------------------------------------------------------
// ArtifactEvent
// ---------------------------------------------------------------------------

/// One lifecycle event of a query-to-artifact transaction.
///
/// On the wire every event is a `{ "type": ..., "content": ... }` pair;
/// `clear` and `finish` carry empty content.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactEvent {
    Kind(ArtifactKind),
    Id(ArtifactId),
    Title(String),
    /// Tells the consumer to reset any prior rendering before new content.
    Clear,
    /// The CSV payload (full text, error marker, or too-large placeholder).
    SheetDelta(String),
    /// Terminal event; nothing follows within the transaction.
    Finish,
}

impl ArtifactEvent {
    /// The wire discriminator.
    pub fn event_type(&self) -> &'static str {
        match self {
            ArtifactEvent::Kind(_) => "kind",
            ArtifactEvent::Id(_) => "id",
            ArtifactEvent::Title(_) => "title",
            ArtifactEvent::Clear => "clear",
            ArtifactEvent::SheetDelta(_) => "sheet-delta",
            ArtifactEvent::Finish => "finish",
        }
    }

    /// The wire content ("" for `clear` and `finish`).
    pub fn content(&self) -> String {
        match self {
            ArtifactEvent::Kind(kind) => kind.to_string(),
            ArtifactEvent::Id(id) => id.to_string(),
            ArtifactEvent::Title(title) => title.clone(),
            ArtifactEvent::SheetDelta(csv) => csv.clone(),
            ArtifactEvent::Clear | ArtifactEvent::Finish => String::new(),
        }
    }
}

impl Serialize for ArtifactEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ArtifactEvent", 2)?;
        s.serialize_field("type", self.event_type())?;
        s.serialize_field("content", &self.content())?;
        s.end()
    }
}

// ---------------------------------------------------------------------------
// EventSink
// ---------------------------------------------------------------------------

/// Receives the transaction's events in emission order.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ArtifactEvent);
}

/// No-op sink for headless/test usage.
pub struct SilentSink;

impl EventSink for SilentSink {
    fn emit(&self, _event: ArtifactEvent) {}
}

/// Sink backed by an unbounded tokio channel. Send order on the channel is
/// the ordering guarantee consumers rely on.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ArtifactEvent>,
}

impl ChannelSink {
    /// Create the sink plus the receiving half for the consumer.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ArtifactEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ArtifactEvent) {
        // A departed consumer is not an error; the envelope remains the
        // transaction's source of truth.
        let _ = self.tx.send(event);
    }
}
