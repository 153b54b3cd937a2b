//! HTTP client for the chat backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use ragchat_core::defaults;
use ragchat_core::models::validate_conversation_id;
use ragchat_core::{
    ChatApi, ChatResponse, ConversationHistory, ConversationList, DeleteResponse, Error,
    HealthStatus, QueryRequest, Result, UploadFile, UploadResponse, WebSearchRequest,
};

use crate::config::ClientConfig;
use crate::middleware::normalize_response;

/// Client for the chat backend's HTTP API.
///
/// Holds an immutable configuration and a pooled [`reqwest::Client`].
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            Error::Config(format!("Invalid base URL {:?}: {}", config.base_url, e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Base URL must be an http(s) origin: {}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut client_builder = Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_seconds {
            client_builder = client_builder.timeout(Duration::from_secs(secs));
        }

        let client = client_builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "client",
            base_url = %base_url,
            timeout_secs = ?config.timeout_seconds,
            "Initializing chat API client"
        );

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Create with default configuration (local development server).
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for an API path such as `/health`.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        self.build_url(path, None)
    }

    /// Resolve `path` (plus an optional trailing id segment) against the base
    /// URL, keeping any path prefix the base carries. The id is
    /// percent-encoded as a single segment.
    fn build_url(&self, path: &str, id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::Config(format!("Base URL cannot be a base: {}", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request through the error-normalization middleware and hand
    /// back the raw successful response.
    async fn dispatch(
        &self,
        op: &'static str,
        request: RequestBuilder,
    ) -> Result<reqwest::Response> {
        let start = Instant::now();
        let outcome = request.send().await;

        if let Ok(response) = &outcome {
            debug!(
                subsystem = "client",
                op,
                url = %response.url(),
                status = response.status().as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Response received"
            );
        }

        normalize_response(outcome).await.inspect_err(|e| {
            warn!(
                subsystem = "client",
                op,
                status = ?e.status().map(|s| s.as_u16()),
                duration_ms = start.elapsed().as_millis() as u64,
                error = %e,
                "API error"
            );
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        op: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.dispatch(op, request).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Like [`execute`](Self::execute), but an empty body decodes to `T::default()`.
    async fn execute_or_default<T>(&self, op: &'static str, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.dispatch(op, request).await?;
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ChatApi for ApiClient {
    #[instrument(skip_all, fields(subsystem = "client", op = "upload_pdf", file_name = %file.file_name))]
    async fn upload_pdf(&self, file: UploadFile) -> Result<UploadResponse> {
        debug!(
            bytes = file.bytes.len(),
            mime_type = %file.mime_type,
            "Uploading document"
        );

        let UploadFile {
            file_name,
            bytes,
            mime_type,
        } = file;
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|e| {
                Error::InvalidInput(format!("Invalid content type {}: {}", mime_type, e))
            })?;
        let form = Form::new().part(defaults::UPLOAD_FIELD, part);

        let url = self.build_url(defaults::PATH_UPLOAD, None)?;
        self.execute("upload_pdf", self.request(Method::POST, url).multipart(form))
            .await
    }

    #[instrument(skip_all, fields(
        subsystem = "client",
        op = "send_query",
        conversation_id = request.conversation_id.as_deref().unwrap_or("(new)"),
        top_k = request.top_k,
    ))]
    async fn send_query(&self, request: QueryRequest) -> Result<ChatResponse> {
        request.validate()?;

        let url = self.build_url(defaults::PATH_QUERY, None)?;
        self.execute("send_query", self.request(Method::POST, url).json(&request))
            .await
    }

    #[instrument(skip(self), fields(subsystem = "client", op = "perform_web_search"))]
    async fn perform_web_search(
        &self,
        conversation_id: &str,
        approved: bool,
    ) -> Result<ChatResponse> {
        validate_conversation_id(conversation_id)?;

        let body = WebSearchRequest {
            conversation_id: conversation_id.to_string(),
            approved,
        };
        let url = self.build_url(defaults::PATH_WEB_SEARCH, None)?;
        self.execute("perform_web_search", self.request(Method::POST, url).json(&body))
            .await
    }

    #[instrument(skip(self), fields(subsystem = "client", op = "get_conversation_history"))]
    async fn get_conversation_history(
        &self,
        conversation_id: &str,
    ) -> Result<ConversationHistory> {
        validate_conversation_id(conversation_id)?;

        let url = self.build_url(defaults::PATH_CONVERSATIONS, Some(conversation_id))?;
        self.execute("get_conversation_history", self.request(Method::GET, url))
            .await
    }

    #[instrument(skip(self), fields(subsystem = "client", op = "get_all_conversations"))]
    async fn get_all_conversations(&self) -> Result<ConversationList> {
        let url = self.build_url(defaults::PATH_CONVERSATIONS, None)?;
        self.execute("get_all_conversations", self.request(Method::GET, url))
            .await
    }

    #[instrument(skip(self), fields(subsystem = "client", op = "delete_conversation"))]
    async fn delete_conversation(&self, conversation_id: &str) -> Result<DeleteResponse> {
        validate_conversation_id(conversation_id)?;

        let url = self.build_url(defaults::PATH_CONVERSATIONS, Some(conversation_id))?;
        self.execute_or_default("delete_conversation", self.request(Method::DELETE, url))
            .await
    }

    #[instrument(skip(self), fields(subsystem = "client", op = "health_check"))]
    async fn health_check(&self) -> Result<HealthStatus> {
        let url = self.build_url(defaults::PATH_HEALTH, None)?;
        self.execute("health_check", self.request(Method::GET, url))
            .await
    }
}
