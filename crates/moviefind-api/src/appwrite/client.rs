//! `AppwriteClient` - Appwrite documents API client implementation.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;
use url::Url;

use super::api::AnalyticsStore;
use super::query::Query;
use super::types::{
    AppwriteErrorResponse, DocumentList, NewSearchCount, SearchCountRecord, TrendingEntry,
    normalize_query,
};
use crate::tmdb::Movie;

/// Default Appwrite Cloud endpoint.
const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1/";

/// Header carrying the project ID.
const PROJECT_HEADER: &str = "X-Appwrite-Project";

/// Header carrying the server API key.
const KEY_HEADER: &str = "X-Appwrite-Key";

/// Document ID placeholder asking the server to generate one.
const UNIQUE_ID: &str = "unique()";

/// Appwrite documents API client bound to one collection.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct AppwriteClient {
    /// HTTP client.
    http_client: Client,
    /// `{endpoint}/databases/{db}/collections/{col}/documents`.
    documents_url: Url,
    /// Project ID.
    project_id: String,
    /// Optional server API key.
    api_key: Option<String>,
}

/// Builder for `AppwriteClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct AppwriteClientBuilder {
    endpoint: Option<Url>,
    project_id: Option<String>,
    database_id: Option<String>,
    collection_id: Option<String>,
    api_key: Option<String>,
    user_agent: Option<String>,
}

impl AppwriteClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            endpoint: None,
            project_id: None,
            database_id: None,
            collection_id: None,
            api_key: None,
            user_agent: None,
        }
    }

    /// Overrides the API endpoint (default: Appwrite Cloud).
    #[must_use]
    pub fn endpoint(mut self, url: Url) -> Self {
        self.endpoint = Some(url);
        self
    }

    /// Sets the project ID (required).
    #[must_use]
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    /// Sets the database ID (required).
    #[must_use]
    pub fn database_id(mut self, id: impl Into<String>) -> Self {
        self.database_id = Some(id.into());
        self
    }

    /// Sets the collection ID (required).
    #[must_use]
    pub fn collection_id(mut self, id: impl Into<String>) -> Self {
        self.collection_id = Some(id.into());
        self
    }

    /// Sets the server API key (optional).
    #[must_use]
    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `project_id`, `database_id`, `collection_id` or `user_agent` is not set.
    /// - The documents URL cannot be built from the endpoint.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<AppwriteClient> {
        let project_id = self.project_id.context("project_id is required")?;
        let database_id = self.database_id.context("database_id is required")?;
        let collection_id = self.collection_id.context("collection_id is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let mut endpoint = if let Some(url) = self.endpoint {
            url
        } else {
            let result = Url::parse(DEFAULT_ENDPOINT);
            result.context("invalid default endpoint")?
        };
        // `Url::join` replaces the last segment unless the path ends with '/'.
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let path = format!("databases/{database_id}/collections/{collection_id}/documents");
        let documents_url = endpoint
            .join(&path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(AppwriteClient {
            http_client,
            documents_url,
            project_id,
            api_key: self.api_key,
        })
    }
}

impl AppwriteClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> AppwriteClientBuilder {
        AppwriteClientBuilder::new()
    }

    /// Adds project and key headers.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(PROJECT_HEADER, &self.project_id);
        match &self.api_key {
            Some(key) => request.header(KEY_HEADER, key),
            None => request,
        }
    }

    /// Returns the URL of a single document.
    fn document_url(&self, document_id: &str) -> Result<Url> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("documents URL cannot be a base: {}", self.documents_url))?
            .push(document_id);
        Ok(url)
    }

    /// Fails on any non-success status, decoding the Appwrite error body when possible.
    async fn check_status(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<failed to read body>"));
        if let Ok(error_response) = serde_json::from_str::<AppwriteErrorResponse>(&body) {
            bail!(
                "Appwrite API error (HTTP {}) during {}: type={}, message={}",
                status,
                what,
                error_response.kind,
                error_response.message,
            );
        }
        bail!("Appwrite API error (HTTP {status}) during {what}: {body}");
    }

    /// Lists documents matching the given query strings.
    #[instrument(skip_all)]
    async fn list_documents<T: DeserializeOwned>(&self, queries: &[String]) -> Result<Vec<T>> {
        let params: Vec<(&str, &str)> = queries
            .iter()
            .map(|q| ("queries[]", q.as_str()))
            .collect();

        let request = self
            .authorize(self.http_client.get(self.documents_url.clone()))
            .query(&params)
            .build()
            .context("failed to build list documents request")?;

        tracing::debug!(url = %request.url(), "Appwrite list documents");

        let result = self.http_client.execute(request).await;
        let response = result.context("list documents request failed")?;
        let response = Self::check_status(response, "list documents").await?;

        let body = response
            .text()
            .await
            .context("failed to read list documents body")?;
        let raw_result: std::result::Result<DocumentList<T>, _> = serde_json::from_str(&body);
        let list = raw_result.context("failed to decode list documents response")?;
        Ok(list.documents)
    }

    /// Creates a counter document for the first occurrence of a query.
    #[instrument(skip_all)]
    async fn create_record(&self, data: &NewSearchCount<'_>) -> Result<()> {
        let body = json!({ "documentId": UNIQUE_ID, "data": data });

        let result = self
            .authorize(self.http_client.post(self.documents_url.clone()))
            .json(&body)
            .send()
            .await;
        let response = result.context("create document request failed")?;
        Self::check_status(response, "create document").await?;
        Ok(())
    }

    /// Sets the counter of an existing document.
    #[instrument(skip_all, fields(document_id = %document_id))]
    async fn update_count(&self, document_id: &str, count: u64) -> Result<()> {
        let url = self.document_url(document_id)?;
        let body = json!({ "data": { "count": count } });

        let result = self
            .authorize(self.http_client.patch(url))
            .json(&body)
            .send()
            .await;
        let response = result.context("update document request failed")?;
        Self::check_status(response, "update document").await?;
        Ok(())
    }
}

impl AnalyticsStore for AppwriteClient {
    #[instrument(skip_all, fields(query = %query, movie_id = movie.id))]
    async fn record_search(&self, query: &str, movie: &Movie) -> Result<()> {
        let key = normalize_query(query);
        if key.is_empty() {
            tracing::debug!("Blank query, nothing to record");
            return Ok(());
        }

        let existing: Vec<SearchCountRecord> = self
            .list_documents(&[Query::equal("query", &key), Query::limit(1)])
            .await
            .with_context(|| format!("failed to look up search counter for {key:?}"))?;

        if let Some(record) = existing.into_iter().next() {
            let count = record.count.saturating_add(1);
            self.update_count(&record.id, count)
                .await
                .with_context(|| format!("failed to increment search counter for {key:?}"))?;
            tracing::debug!(query = %key, count, "Search counter incremented");
        } else {
            self.create_record(&NewSearchCount::first(&key, movie))
                .await
                .with_context(|| format!("failed to create search counter for {key:?}"))?;
            tracing::debug!(query = %key, "Search counter created");
        }
        Ok(())
    }

    #[instrument(skip_all, fields(limit = limit))]
    async fn trending(&self, limit: u32) -> Result<Vec<TrendingEntry>> {
        let records: Vec<SearchCountRecord> = self
            .list_documents(&[Query::order_desc("count"), Query::limit(limit)])
            .await
            .context("failed to load trending searches")?;
        Ok(records.into_iter().map(TrendingEntry::from).collect())
    }
}
