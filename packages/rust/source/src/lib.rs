//! External data source client.
//!
//! The data source is an opaque HTTP service: POST a natural-language prompt,
//! receive `{ "data": [ {field: value}, ... ] }`. Only its success/failure
//! outcome matters to the pipeline — availability and latency are the
//! caller's problem, and every failure mode (transport, non-2xx, malformed
//! body) surfaces as one upstream error the transaction recovers from.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument};
use url::Url;

use sheetcast_shared::{QueryConfig, QueryResult, Result, SheetcastError};

/// User-Agent string for query requests.
const USER_AGENT: &str = concat!("Sheetcast/", env!("CARGO_PKG_VERSION"));

/// Tenant/brand identifier header sent with every query.
const BRAND_HEADER: &str = "brandid";

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Seam between the transaction and the upstream service, so the pipeline
/// can run against the real client or a test stub.
pub trait DataSource {
    /// Run one query; the returned records are untruncated.
    fn fetch(&self, prompt: &str) -> impl Future<Output = Result<QueryResult>> + Send;
}

// ---------------------------------------------------------------------------
// SourceClient
// ---------------------------------------------------------------------------

/// Request body for the query endpoint.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    prompt: &'a str,
}

/// Response body from the query endpoint.
#[derive(Debug, serde::Deserialize)]
struct SourceResponse {
    data: QueryResult,
}

/// HTTP client for the external data source.
pub struct SourceClient {
    client: Client,
    endpoint: Url,
    brand_id: String,
}

impl SourceClient {
    /// Build a client from the resolved runtime config.
    pub fn new(config: &QueryConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.source_timeout_secs))
            .build()
            .map_err(|e| SheetcastError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.source_endpoint.clone(),
            brand_id: config.brand_id.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl DataSource for SourceClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn fetch(&self, prompt: &str) -> Result<QueryResult> {
        debug!(prompt_len = prompt.len(), "querying external source");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(BRAND_HEADER, &self.brand_id)
            .json(&QueryRequest { prompt })
            .send()
            .await
            .map_err(|e| SheetcastError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetcastError::Network(format!(
                "{}: HTTP {status}",
                self.endpoint
            )));
        }

        let body: SourceResponse = response
            .json()
            .await
            .map_err(|e| SheetcastError::parse(format!("malformed source response: {e}")))?;

        info!(rows = body.data.len(), "query returned");
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcast_shared::AppConfig;

    #[test]
    fn request_body_shape() {
        let json = serde_json::to_string(&QueryRequest {
            prompt: "top customers",
        })
        .expect("serialize");
        assert_eq!(json, r#"{"prompt":"top customers"}"#);
    }

    #[test]
    fn response_preserves_record_order() {
        let json = r#"{"data":[{"name":"Alice","age":"30"},{"name":"Bob","age":"25"}]}"#;
        let response: SourceResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.data.len(), 2);
        let names: Vec<&str> = response.data.records[0].field_names().collect();
        assert_eq!(names, vec!["name", "age"]);
    }

    #[test]
    fn response_without_data_is_malformed() {
        let json = r#"{"rows":[]}"#;
        assert!(serde_json::from_str::<SourceResponse>(json).is_err());
    }

    #[test]
    fn client_builds_from_config() {
        let config = QueryConfig::resolve(&AppConfig::default()).expect("resolve");
        let client = SourceClient::new(&config).expect("client");
        assert_eq!(
            client.endpoint().as_str(),
            "http://localhost:5050/health/chatbot"
        );
    }

    #[tokio::test]
    async fn fetch_against_unroutable_endpoint_is_a_network_error() {
        let mut app = AppConfig::default();
        // Reserved TEST-NET address; connection fails fast without DNS.
        app.source.endpoint = "http://192.0.2.1:1/query".into();
        app.source.timeout_secs = 1;
        let config = QueryConfig::resolve(&app).expect("resolve");
        let client = SourceClient::new(&config).expect("client");

        let err = client.fetch("anything").await.unwrap_err();
        assert!(matches!(err, SheetcastError::Network(_)));
    }
}
