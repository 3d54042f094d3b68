//! `PostgREST` client implementing the remote store contract.
//!
//! Collections map to REST resources: `select=*` GETs, `Prefer:
//! return=representation` inserts, merge-duplicates upserts, and
//! `id=eq.` deletes. Failures are classified onto the store error
//! taxonomy so callers can surface actionable messages (missing table,
//! row-policy rejection, unreachable host).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use folio_core::{RecordId, RemoteStore, StoreError};

/// How long to wait for a connection to be established.
///
/// Requests in flight are intentionally unbounded; only connection
/// setup fails fast when the host is down.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors building a [`PostgrestStore`].
#[derive(Debug, Error)]
pub enum RemoteConfigError {
    /// The configured base URL is not usable.
    #[error("invalid store URL: {0}")]
    InvalidUrl(String),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// `PostgREST`-backed [`RemoteStore`].
#[derive(Clone)]
pub struct PostgrestStore {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    base: Url,
}

impl PostgrestStore {
    /// Create a store client for the given endpoint.
    ///
    /// `api_key`, when present, is sent both as the `apikey` header and
    /// as a bearer token, matching the Supabase flavour of `PostgREST`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteConfigError`] when the URL is malformed or the
    /// HTTP client fails to build.
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: Option<&str>,
    ) -> Result<Self, RemoteConfigError> {
        let base = Url::parse(base_url.as_ref())
            .map_err(|e| RemoteConfigError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RemoteConfigError::InvalidUrl(format!(
                "'{base}' cannot be used as a base URL"
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| RemoteConfigError::Client(e.to_string()))?;
            headers.insert("apikey", value);
            let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| RemoteConfigError::Client(e.to_string()))?;
            headers.insert(AUTHORIZATION, bearer);
        }

        let http = Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| RemoteConfigError::Client(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Inner { http, base }),
        })
    }

    fn collection_url(&self, collection: &str) -> Result<Url, StoreError> {
        let mut url = self.inner.base.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::RemoteUnavailable("store URL has no path".to_string()))?
            .pop_if_empty()
            .push(collection);
        Ok(url)
    }

    /// Send a request and decode the row payload on success.
    async fn rows(
        &self,
        request: RequestBuilder,
        collection: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(classify_failure(response, collection).await);
        }
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::RowDecode(e.to_string()))
    }

    /// As [`Self::rows`] but expects exactly one returned row.
    async fn single_row(
        &self,
        request: RequestBuilder,
        collection: &str,
    ) -> Result<Value, StoreError> {
        let mut rows = self.rows(request, collection).await?;
        if rows.is_empty() {
            return Err(StoreError::RowDecode(format!(
                "'{collection}' returned no representation for the written row"
            )));
        }
        Ok(rows.remove(0))
    }
}

/// Map a failed HTTP response onto the store error taxonomy.
async fn classify_failure(response: Response, collection: &str) -> StoreError {
    let status = response.status();
    let body: Option<Value> = response.json().await.ok();
    let code = body
        .as_ref()
        .and_then(|b| b.get("code"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let message = body
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || message.contains("security policy")
        || message.contains("permission denied")
    {
        return StoreError::PermissionDenied {
            collection: collection.to_string(),
        };
    }
    // 42P01 is Postgres "undefined table"; PGRST2xx are PostgREST schema
    // cache misses for unknown relations.
    if status == StatusCode::NOT_FOUND
        || code == "42P01"
        || code.starts_with("PGRST2")
        || message.contains("does not exist")
    {
        return StoreError::SchemaMissing {
            collection: collection.to_string(),
        };
    }
    StoreError::RemoteUnavailable(if message.is_empty() {
        format!("store answered {status}")
    } else {
        format!("store answered {status}: {message}")
    })
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    async fn select_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let url = self.collection_url(collection)?;
        let request = self.inner.http.get(url).query(&[("select", "*")]);
        self.rows(request, collection).await
    }

    async fn insert(&self, collection: &str, row: Value) -> Result<Value, StoreError> {
        let url = self.collection_url(collection)?;
        let request = self
            .inner
            .http
            .post(url)
            .header("Prefer", "return=representation")
            .json(&vec![row]);
        self.single_row(request, collection).await
    }

    async fn upsert(&self, collection: &str, row: Value) -> Result<Value, StoreError> {
        let url = self.collection_url(collection)?;
        let request = self
            .inner
            .http
            .post(url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&vec![row]);
        self.single_row(request, collection).await
    }

    async fn delete(&self, collection: &str, id: RecordId) -> Result<(), StoreError> {
        let url = self.collection_url(collection)?;
        let request = self
            .inner
            .http
            .delete(url)
            .query(&[("id", format!("eq.{id}"))]);
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(classify_failure(response, collection).await);
        }
        Ok(())
    }
}
