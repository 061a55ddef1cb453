//! Inline-vs-offload decision for encoded CSV documents.

use tracing::{debug, info, instrument};

use sheetcast_codec::CsvDocument;
use sheetcast_shared::{ArtifactId, Result};

use crate::ObjectStore;

/// Largest CSV payload (UTF-8 bytes) delivered inline. One byte over and the
/// document goes to the object store instead.
pub const MAX_INLINE_BYTES: usize = 1_000_000;

/// How one document travels to the consumer.
///
/// `Remote` carries the store URL; there is no state in which an oversized
/// document is delivered inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The full text travels in the content event.
    Inline,
    /// The bytes were persisted under `<id>.csv`; only the URL travels.
    Remote { url: String },
}

impl Delivery {
    pub fn is_remote(&self) -> bool {
        matches!(self, Delivery::Remote { .. })
    }

    /// The store URL, or "" for inline delivery.
    pub fn url(&self) -> &str {
        match self {
            Delivery::Inline => "",
            Delivery::Remote { url } => url,
        }
    }
}

/// Decide delivery for `doc` and, when oversized, persist it to the store.
///
/// The put is awaited as part of the transaction — the artifact is not ready
/// until the store confirms. A store failure is fatal to the transaction:
/// falling back to inlining an oversized payload is not an option.
#[instrument(skip_all, fields(artifact_id = %id, bytes = doc.byte_size))]
pub async fn offload<S: ObjectStore>(
    store: &S,
    doc: &CsvDocument,
    id: &ArtifactId,
) -> Result<Delivery> {
    if doc.byte_size <= MAX_INLINE_BYTES {
        debug!("payload fits inline");
        return Ok(Delivery::Inline);
    }

    let key = id.csv_key();
    info!(%key, "payload exceeds inline limit, offloading to object store");

    let url = store.put(&key, doc.text.as_bytes()).await?;

    info!(%url, hash = %doc.content_hash, "offload complete");
    Ok(Delivery::Remote { url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcast_shared::SheetcastError;

    use crate::MemoryObjectStore;

    /// Store double whose puts always fail.
    struct FailingStore;

    impl ObjectStore for FailingStore {
        async fn put(&self, _key: &str, _bytes: &[u8]) -> Result<String> {
            Err(SheetcastError::Store("store unavailable".into()))
        }
    }

    fn doc_of_size(bytes: usize) -> CsvDocument {
        let doc = CsvDocument::new("x".repeat(bytes));
        assert_eq!(doc.byte_size, bytes);
        doc
    }

    #[tokio::test]
    async fn at_threshold_stays_inline() {
        let store = MemoryObjectStore::new();
        let doc = doc_of_size(MAX_INLINE_BYTES);

        let delivery = offload(&store, &doc, &ArtifactId::new()).await.unwrap();
        assert_eq!(delivery, Delivery::Inline);
        assert_eq!(delivery.url(), "");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn one_byte_over_offloads() {
        let store = MemoryObjectStore::new();
        let doc = doc_of_size(MAX_INLINE_BYTES + 1);
        let id = ArtifactId::new();

        let delivery = offload(&store, &doc, &id).await.unwrap();
        assert!(delivery.is_remote());
        assert_eq!(delivery.url(), format!("memory://{}", id.csv_key()));
        assert_eq!(
            store.get(&id.csv_key()).map(|b| b.len()),
            Some(MAX_INLINE_BYTES + 1)
        );
    }

    #[tokio::test]
    async fn store_failure_is_fatal() {
        let doc = doc_of_size(MAX_INLINE_BYTES + 1);
        let err = offload(&FailingStore, &doc, &ArtifactId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SheetcastError::Store(_)));
    }

    #[tokio::test]
    async fn small_documents_never_touch_the_store() {
        // Even a failing store is fine when the payload fits inline.
        let doc = CsvDocument::new("\"a\"\n\"1\"".to_string());
        let delivery = offload(&FailingStore, &doc, &ArtifactId::new())
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::Inline);
    }
}
