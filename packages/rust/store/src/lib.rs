//! Addressable object store clients and the overflow offload decision.
//!
//! The store is the only shared external resource in the pipeline. Each
//! transaction writes a distinct `<artifact-id>.csv` key, so writes never
//! collide and no cross-transaction coordination is needed.

mod offload;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use sheetcast_shared::{Result, SheetcastError};

pub use offload::{Delivery, MAX_INLINE_BYTES, offload};

/// User-Agent string for store requests.
const USER_AGENT: &str = concat!("Sheetcast/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// ObjectStore
// ---------------------------------------------------------------------------

/// Addressable blob storage: `put(key, bytes)` returns a URL under which the
/// bytes are durably readable. Put is atomic — once a URL comes back, the
/// object exists.
pub trait ObjectStore {
    fn put(&self, key: &str, bytes: &[u8]) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// HttpObjectStore
// ---------------------------------------------------------------------------

/// Response body from the store's put endpoint.
#[derive(Debug, serde::Deserialize)]
struct PutResponse {
    url: String,
}

/// HTTP-backed object store: POSTs bytes to `<endpoint>/<key>` and expects
/// `{ "url": ... }` back.
pub struct HttpObjectStore {
    client: Client,
    endpoint: Url,
}

impl HttpObjectStore {
    /// Build a store client. The endpoint is treated as a directory — a
    /// trailing slash is added if missing so keys join as path segments.
    pub fn new(endpoint: Url, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SheetcastError::Store(format!("failed to build HTTP client: {e}")))?;

        let mut endpoint = endpoint;
        if !endpoint.path().ends_with('/') {
            endpoint.set_path(&format!("{}/", endpoint.path()));
        }

        Ok(Self { client, endpoint })
    }
}

impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String> {
        let target = self
            .endpoint
            .join(key)
            .map_err(|e| SheetcastError::Store(format!("invalid store key {key:?}: {e}")))?;

        debug!(%target, bytes = bytes.len(), "putting object");

        let response = self
            .client
            .post(target.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| SheetcastError::Store(format!("{target}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetcastError::Store(format!("{target}: HTTP {status}")));
        }

        let body: PutResponse = response
            .json()
            .await
            .map_err(|e| SheetcastError::Store(format!("malformed put response: {e}")))?;

        Ok(body.url)
    }
}

// ---------------------------------------------------------------------------
// MemoryObjectStore
// ---------------------------------------------------------------------------

/// In-process store for tests and store-less local runs. Returned URLs use
/// the `memory://` scheme.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(format!("memory://{key}"))
    }
}
