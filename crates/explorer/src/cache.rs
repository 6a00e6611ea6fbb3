//! OpenAPI document cache.
//!
//! Fetches schema documents over HTTP, detects the serialization format, applies a
//! minimal shape check, and memoizes the parsed tree keyed by `(url, headers)` for the
//! lifetime of the process. There is no eviction and no automatic invalidation; callers
//! that need fresh data call [`SchemaCache::clear`].

use crate::error::{ExplorerError, Result};
use parking_lot::{Mutex, RwLock};
use reqwest::Client;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for schema fetches.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-wide cache of parsed OpenAPI/Swagger documents.
///
/// Constructor-injected rather than global so tests can build isolated instances. The
/// underlying HTTP client releases its resources when the cache is dropped.
pub struct SchemaCache {
    client: Client,
    timeout: Duration,
    documents: RwLock<HashMap<String, Arc<Value>>>,
    /// Per-key fetch gates: concurrent requesters for a still-uncached key await a
    /// single in-flight fetch instead of issuing redundant requests.
    gates: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SchemaCache {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
            documents: RwLock::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Get the parsed document for a `(url, headers)` pair, fetching on first use.
    ///
    /// A key, once populated, is never re-fetched. Failed fetches do not populate the
    /// cache, so a later call can retry after a transient failure.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Fetch`] on network/HTTP failure, [`ExplorerError::Parse`]
    /// on a malformed body, and [`ExplorerError::Shape`] when the body parses but is not
    /// a recognizable OpenAPI/Swagger document.
    pub async fn get_schema(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Arc<Value>> {
        let key = cache_key(url, headers);

        // Fast path: cache hit.
        if let Some(doc) = self.documents.read().get(&key).cloned() {
            return Ok(doc);
        }

        let gate = self.gates.lock().entry(key.clone()).or_default().clone();
        let _fetching = gate.lock().await;

        // Re-check: another caller may have populated the key while we waited.
        if let Some(doc) = self.documents.read().get(&key).cloned() {
            return Ok(doc);
        }

        let doc = Arc::new(self.fetch_schema(url, headers).await?);
        self.documents.write().insert(key, Arc::clone(&doc));
        tracing::info!("Cached OpenAPI schema from {url}");
        Ok(doc)
    }

    async fn fetch_schema(&self, url: &str, headers: &HashMap<String, String>) -> Result<Value> {
        tracing::info!("Fetching OpenAPI schema from {url}");

        let mut request = self.client.get(url).timeout(self.timeout);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| ExplorerError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::Fetch {
                url: url.to_string(),
                message: format!("HTTP status {status}"),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let body = response.text().await.map_err(|e| ExplorerError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let doc: Value = if is_yaml(&content_type, url) {
            serde_yaml::from_str(&body).map_err(|e| ExplorerError::Parse {
                url: url.to_string(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&body).map_err(|e| ExplorerError::Parse {
                url: url.to_string(),
                message: e.to_string(),
            })?
        };

        validate_shape(url, &doc)?;
        Ok(doc)
    }

    /// Drop every cached document. Atomic swap to an empty map; in-flight fetches that
    /// complete afterwards re-populate their key normally.
    pub fn clear(&self) {
        *self.documents.write() = HashMap::new();
        tracing::info!("Cleared OpenAPI schema cache");
    }

    /// Number of cached documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

/// Canonical cache key for a `(url, headers)` pair: the URL alone when there are no
/// headers, else the URL plus a digest of the sorted header pairs.
fn cache_key(url: &str, headers: &HashMap<String, String>) -> String {
    if headers.is_empty() {
        return url.to_string();
    }

    let mut pairs: Vec<(&str, &str)> = headers
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.sort_unstable();

    let mut hasher = Sha256::new();
    for (name, value) in pairs {
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    }
    format!("{url}#{}", hex::encode(hasher.finalize()))
}

/// Serialization format detection: declared content type first (substring match), then
/// the URL's file suffix; JSON otherwise.
fn is_yaml(content_type: &str, url: &str) -> bool {
    if content_type.contains("yaml") || content_type.contains("yml") {
        return true;
    }
    if content_type.contains("json") {
        return false;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.ends_with(".yaml") || path.ends_with(".yml")
}

fn validate_shape(url: &str, doc: &Value) -> Result<()> {
    let Some(map) = doc.as_object() else {
        return Err(ExplorerError::Shape(format!(
            "document from '{url}' is not a mapping"
        )));
    };
    if !map.contains_key("openapi") && !map.contains_key("swagger") {
        return Err(ExplorerError::Shape(format!(
            "document from '{url}' has neither an 'openapi' nor a 'swagger' key"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::header;
    use axum::routing::get;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    struct TestServer {
        base_url: String,
        hits: Arc<AtomicUsize>,
        shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    }

    impl TestServer {
        async fn spawn(body: &'static str, content_type: &'static str) -> Self {
            let hits = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&hits);
            let app = Router::new().route(
                "/spec",
                get(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async move { ([(header::CONTENT_TYPE, content_type)], body) }
                }),
            );

            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            let addr = listener.local_addr().expect("local_addr");
            let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            tokio::spawn(async move {
                let _ = server.await;
            });

            Self {
                base_url: format!("http://{addr}"),
                hits,
                shutdown: Some(shutdown_tx),
            }
        }

        fn spec_url(&self) -> String {
            format!("{}/spec", self.base_url)
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(tx) = self.shutdown.take() {
                let _ = tx.send(());
            }
        }
    }

    #[test]
    fn cache_key_is_url_without_headers() {
        assert_eq!(
            cache_key("https://example.com/openapi.json", &HashMap::new()),
            "https://example.com/openapi.json"
        );
    }

    #[test]
    fn cache_key_is_header_order_insensitive() {
        let mut a = HashMap::new();
        a.insert("Authorization".to_string(), "Bearer t".to_string());
        a.insert("X-Api-Key".to_string(), "k".to_string());
        let mut b = HashMap::new();
        b.insert("X-Api-Key".to_string(), "k".to_string());
        b.insert("Authorization".to_string(), "Bearer t".to_string());

        let url = "https://example.com/openapi.json";
        assert_eq!(cache_key(url, &a), cache_key(url, &b));
        assert_ne!(cache_key(url, &a), url);

        let mut c = HashMap::new();
        c.insert("Authorization".to_string(), "Bearer other".to_string());
        c.insert("X-Api-Key".to_string(), "k".to_string());
        assert_ne!(cache_key(url, &a), cache_key(url, &c));
    }

    #[test]
    fn yaml_detection_prefers_content_type_then_suffix() {
        assert!(is_yaml("application/yaml", "https://x/spec"));
        assert!(is_yaml("text/x-yml", "https://x/spec"));
        assert!(!is_yaml("application/json", "https://x/spec.yaml"));
        assert!(is_yaml("", "https://x/openapi.yaml"));
        assert!(is_yaml("", "https://x/openapi.yml?token=a"));
        assert!(!is_yaml("", "https://x/openapi.json"));
        assert!(!is_yaml("text/plain", "https://x/spec"));
    }

    #[tokio::test]
    async fn second_call_hits_the_cache() {
        let server = TestServer::spawn(
            r#"{"openapi": "3.0.0", "info": {"title": "t", "version": "1"}}"#,
            "application/json",
        )
        .await;
        let cache = SchemaCache::new(DEFAULT_HTTP_TIMEOUT);
        let headers = HashMap::new();

        let first = cache.get_schema(&server.spec_url(), &headers).await.unwrap();
        let second = cache.get_schema(&server.spec_url(), &headers).await.unwrap();

        assert_eq!(server.hits(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn distinct_headers_are_distinct_cache_entries() {
        let server = TestServer::spawn(
            r#"{"openapi": "3.0.0", "info": {"title": "t", "version": "1"}}"#,
            "application/json",
        )
        .await;
        let cache = SchemaCache::new(DEFAULT_HTTP_TIMEOUT);

        let mut authed = HashMap::new();
        authed.insert("Authorization".to_string(), "Bearer t".to_string());

        cache
            .get_schema(&server.spec_url(), &HashMap::new())
            .await
            .unwrap();
        cache.get_schema(&server.spec_url(), &authed).await.unwrap();

        assert_eq!(server.hits(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_fetch() {
        let server = TestServer::spawn(
            r#"{"openapi": "3.0.0", "info": {"title": "t", "version": "1"}}"#,
            "application/json",
        )
        .await;
        let cache = SchemaCache::new(DEFAULT_HTTP_TIMEOUT);
        let url = server.spec_url();
        let headers = HashMap::new();

        let (a, b, c) = tokio::join!(
            cache.get_schema(&url, &headers),
            cache.get_schema(&url, &headers),
            cache.get_schema(&url, &headers),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn yaml_documents_parse_via_content_type() {
        let server = TestServer::spawn(
            "openapi: 3.0.0\ninfo:\n  title: t\n  version: '1'\n",
            "application/yaml",
        )
        .await;
        let cache = SchemaCache::new(DEFAULT_HTTP_TIMEOUT);

        let doc = cache
            .get_schema(&server.spec_url(), &HashMap::new())
            .await
            .unwrap();
        assert_eq!(
            doc.get("info").and_then(|i| i.get("title")),
            Some(&Value::String("t".to_string()))
        );
    }

    #[tokio::test]
    async fn shape_violations_are_not_cached() {
        let server = TestServer::spawn(r#"{"not_openapi": true}"#, "application/json").await;
        let cache = SchemaCache::new(DEFAULT_HTTP_TIMEOUT);

        let err = cache
            .get_schema(&server.spec_url(), &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Shape(_)));
        assert!(cache.is_empty());

        // Retry is possible: the failed result was not memoized.
        let _ = cache.get_schema(&server.spec_url(), &HashMap::new()).await;
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let server = TestServer::spawn("{ not json", "application/json").await;
        let cache = SchemaCache::new(DEFAULT_HTTP_TIMEOUT);

        let err = cache
            .get_schema(&server.spec_url(), &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Parse { .. }));
    }

    #[tokio::test]
    async fn clear_forces_a_refetch() {
        let server = TestServer::spawn(
            r#"{"swagger": "2.0", "info": {"title": "t", "version": "1"}}"#,
            "application/json",
        )
        .await;
        let cache = SchemaCache::new(DEFAULT_HTTP_TIMEOUT);
        let headers = HashMap::new();

        cache.get_schema(&server.spec_url(), &headers).await.unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache.get_schema(&server.spec_url(), &headers).await.unwrap();

        assert_eq!(server.hits(), 2);
    }
}
