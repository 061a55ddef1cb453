//! The one-shot query-to-artifact transaction.
//!
//! One run per query request. The whole transaction is a single sequential
//! async task; its only suspension points are the source fetch and the store
//! put. Concurrent transactions share no mutable state — each owns its own
//! id-scoped document and store key.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use sheetcast_codec::CsvDocument;
use sheetcast_shared::{
    ArtifactEnvelope, ArtifactId, ArtifactKind, CSV_ERROR_MARKER, CSV_TOO_LARGE_PLACEHOLDER,
    CsvData, MAX_RECORDS, Result,
};
use sheetcast_source::DataSource;
use sheetcast_store::{Delivery, ObjectStore, offload};

use crate::events::{ArtifactEvent, EventSink};

/// Human-readable summary carried in the envelope's `content` field.
pub const ARTIFACT_SUMMARY: &str = "A sheet artifact was created from the database query.";

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Emitter states. A run only ever moves forward, one stage at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Stage {
    Idle = 0,
    Announced = 1,
    Cleared = 2,
    Delivered = 3,
    Finished = 4,
}

fn advance(stage: &mut Stage, next: Stage) {
    debug_assert_eq!(
        next as u8,
        *stage as u8 + 1,
        "illegal emitter transition {stage:?} -> {next:?}"
    );
    *stage = next;
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Run one query-to-artifact transaction.
///
/// Emits the announcement events, fetches and encodes the result, makes the
/// offload decision, emits the single content event and the terminal finish
/// event, and returns the envelope.
///
/// An upstream failure does not abort the run — the error marker becomes the
/// CSV content and the machine continues to Finished. A store failure during
/// offload does abort it: no envelope, and no finish event, because inlining
/// an oversized payload is never an acceptable fallback.
#[instrument(skip_all, fields(prompt_len = prompt.len()))]
pub async fn run_query<D, S>(
    prompt: &str,
    source: &D,
    store: &S,
    sink: &dyn EventSink,
) -> Result<ArtifactEnvelope>
where
    D: DataSource,
    S: ObjectStore,
{
    let id = ArtifactId::new();
    let kind = ArtifactKind::Sheet;
    let title = prompt.to_string();
    let mut stage = Stage::Idle;

    info!(artifact_id = %id, "starting query transaction");

    // Idle → Announced: four descriptive events in strict order.
    sink.emit(ArtifactEvent::Kind(kind));
    sink.emit(ArtifactEvent::Id(id.clone()));
    sink.emit(ArtifactEvent::Title(title.clone()));
    sink.emit(ArtifactEvent::Clear);
    advance(&mut stage, Stage::Announced);

    // Announced → Cleared: logical no-op; clearing is fire-and-forget and no
    // acknowledgment is awaited from the consumer.
    advance(&mut stage, Stage::Cleared);

    // Cleared → Delivered: fetch, cap, encode, offload, one content event.
    // The fetch outcome stays typed until the emit boundary below.
    let fetched: Result<CsvDocument> = match source.fetch(prompt).await {
        Ok(result) => {
            let total = result.len();
            let mut records = result.records;
            if records.len() > MAX_RECORDS {
                records.truncate(MAX_RECORDS);
                debug!(total, kept = MAX_RECORDS, "row cap applied before encoding");
            }
            Ok(CsvDocument::from_records(&records))
        }
        Err(e) => {
            warn!(error = %e, "upstream query failed, continuing with error marker");
            Err(e)
        }
    };

    let (doc, csv_headers) = match fetched {
        Ok(doc) => {
            let headers = doc.header_line.clone();
            (doc, headers)
        }
        Err(_) => (CsvDocument::new(CSV_ERROR_MARKER.to_string()), String::new()),
    };

    let delivery = offload(store, &doc, &id).await?;

    let csv_content = match &delivery {
        Delivery::Inline => doc.text.clone(),
        Delivery::Remote { .. } => CSV_TOO_LARGE_PLACEHOLDER.to_string(),
    };

    sink.emit(ArtifactEvent::SheetDelta(csv_content.clone()));
    advance(&mut stage, Stage::Delivered);

    // Delivered → Finished: terminal event, then the programmatic result.
    sink.emit(ArtifactEvent::Finish);
    advance(&mut stage, Stage::Finished);

    let envelope = ArtifactEnvelope {
        id,
        title,
        kind,
        content: ARTIFACT_SUMMARY.to_string(),
        created_at: Utc::now(),
        csv_url: delivery.url().to_string(),
        csv_headers: csv_headers.clone(),
        csv_data: CsvData {
            url: delivery.url().to_string(),
            headers: csv_headers,
            csv_content,
        },
    };

    info!(
        artifact_id = %envelope.id,
        remote = delivery.is_remote(),
        "query transaction finished"
    );

    Ok(envelope)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
