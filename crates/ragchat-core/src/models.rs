//! Request and response models for the chat backend API.
//!
//! Requests are built per call and dropped once the response arrives.
//! Response types mirror what the backend returns; unknown fields are
//! ignored so newer servers stay compatible.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// REQUESTS
// =============================================================================

/// A document to upload, sent as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name reported to the server (the server requires a `.pdf` suffix).
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Content type of the part, detected from magic bytes.
    pub mime_type: String,
}

impl UploadFile {
    /// Wrap in-memory bytes, detecting the content type from their signature.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(defaults::UPLOAD_FALLBACK_MIME)
            .to_string();
        Self {
            file_name: file_name.into(),
            bytes,
            mime_type,
        }
    }

    /// Read a file from disk. The part's file name is the path's final component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!("not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, bytes))
    }

    /// Whether the content looks like a PDF document.
    pub fn is_pdf(&self) -> bool {
        self.mime_type == "application/pdf"
    }
}

/// Body of `POST /query`.
///
/// `conversation_id` is always serialized; `null` asks the server to start
/// a new conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub conversation_id: Option<String>,
    pub top_k: u32,
}

impl QueryRequest {
    /// New query with no conversation and the default `top_k`.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            conversation_id: None,
            top_k: defaults::TOP_K,
        }
    }

    /// Continue an existing conversation.
    pub fn conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Override the number of retrieved context chunks.
    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Reject requests the server could never answer.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidInput(
                "top_k must be a positive integer".to_string(),
            ));
        }
        if let Some(id) = &self.conversation_id {
            validate_conversation_id(id)?;
        }
        Ok(())
    }
}

/// Body of `POST /web-search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchRequest {
    pub conversation_id: String,
    pub approved: bool,
}

/// Conversation ids are opaque, but an empty one would address the
/// collection endpoint instead of a single conversation. So would `.` and
/// `..`: URL normalization drops dot segments, encoded or not.
pub fn validate_conversation_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidInput(
            "conversation id must not be empty".to_string(),
        ));
    }
    if matches!(id, "." | "..") {
        return Err(Error::InvalidInput(format!(
            "conversation id {:?} is a path dot segment",
            id
        )));
    }
    Ok(())
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Response from `POST /upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub document_id: String,
    pub chunks_count: u32,
}

/// A retrieved passage backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
    /// Document file name or web URL.
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    pub score: f64,
}

/// A single web search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub source: String,
}

/// Assistant answer, returned by both `/query` and `/web-search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub conversation_id: String,
    /// Set when the assistant wants permission to search the web.
    #[serde(default)]
    pub needs_web_search: bool,
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub web_search_results: Option<Vec<WebSearchResult>>,
}

impl ChatResponse {
    pub fn wants_web_search(&self) -> bool {
        self.needs_web_search
    }
}

/// One query/answer exchange within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: i64,
    pub conversation_id: String,
    pub query: String,
    pub response: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(with = "server_time")]
    pub timestamp: NaiveDateTime,
}

/// Response from `GET /conversations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
    pub conversation_id: String,
    pub messages: Vec<ConversationMessage>,
    #[serde(with = "server_time")]
    pub created_at: NaiveDateTime,
    #[serde(with = "server_time")]
    pub updated_at: NaiveDateTime,
}

/// Listing entry for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub message_count: u32,
    #[serde(with = "server_time")]
    pub created_at: NaiveDateTime,
    #[serde(with = "server_time")]
    pub updated_at: NaiveDateTime,
    /// First query of the conversation, truncated by the server.
    #[serde(default)]
    pub first_query: String,
}

/// Response from `GET /conversations`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationList {
    #[serde(default)]
    pub conversations: Vec<ConversationSummary>,
}

/// Response from `DELETE /conversations/{id}`.
///
/// The backend may answer with an empty body; that decodes to the default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub vector_store_ready: bool,
    #[serde(default)]
    pub web_search_available: bool,
    #[serde(default)]
    pub llm_service_available: bool,
    #[serde(default)]
    pub openai_api_configured: bool,
    #[serde(default)]
    pub tavily_api_configured: bool,
    #[serde(default, with = "server_time::option")]
    pub timestamp: Option<NaiveDateTime>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// Serde adapter for backend timestamps.
///
/// The backend emits naive local times, either ISO-8601 (`T` separator,
/// optional microseconds) or SQLite's `YYYY-MM-DD HH:MM:SS`. Values with an
/// RFC 3339 offset are converted to naive UTC.
pub mod server_time {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
    const SQLITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        [FORMAT, SQLITE_FORMAT]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp: {}", raw))
                }),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    const PDF_MAGIC: &[u8] = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n";

    #[test]
    fn test_query_request_defaults() {
        let request = QueryRequest::new("hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "hello", "conversation_id": null, "top_k": 5})
        );
    }

    #[test]
    fn test_query_request_builder() {
        let request = QueryRequest::new("what is in chapter 2?")
            .conversation("conv-1")
            .top_k(8);
        assert_eq!(request.conversation_id.as_deref(), Some("conv-1"));
        assert_eq!(request.top_k, 8);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_query_request_rejects_empty_query() {
        let err = QueryRequest::new("   ").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_query_request_rejects_zero_top_k() {
        let err = QueryRequest::new("hello").top_k(0).validate().unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }

    #[test]
    fn test_dot_segment_conversation_ids_are_rejected() {
        for id in [".", ".."] {
            let err = validate_conversation_id(id).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "id {:?}", id);
        }
        assert!(validate_conversation_id("...").is_ok());
        assert!(validate_conversation_id(".hidden").is_ok());
        assert!(validate_conversation_id("%2e%2e").is_ok());
    }

    #[test]
    fn test_query_request_rejects_empty_conversation() {
        let err = QueryRequest::new("hello")
            .conversation("")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_web_search_request_serialization() {
        let request = WebSearchRequest {
            conversation_id: "abc".to_string(),
            approved: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"conversation_id": "abc", "approved": true})
        );
    }

    #[test]
    fn test_upload_file_detects_pdf() {
        let file = UploadFile::new("report.pdf", PDF_MAGIC.to_vec());
        assert_eq!(file.mime_type, "application/pdf");
        assert!(file.is_pdf());
    }

    #[test]
    fn test_upload_file_unknown_bytes_fall_back() {
        let file = UploadFile::new("notes.pdf", b"plain text".to_vec());
        assert_eq!(file.mime_type, defaults::UPLOAD_FALLBACK_MIME);
        assert!(!file.is_pdf());
    }

    #[tokio::test]
    async fn test_upload_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        std::fs::write(&path, PDF_MAGIC).unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.file_name, "paper.pdf");
        assert_eq!(file.bytes, PDF_MAGIC);
        assert!(file.is_pdf());
    }

    #[tokio::test]
    async fn test_upload_file_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = UploadFile::from_path(dir.path().join("missing.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_chat_response_minimal() {
        let json = r#"{
            "response": "Web search was not approved.",
            "sources": [],
            "conversation_id": "c1"
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(!response.wants_web_search());
        assert!(response.search_query.is_none());
        assert!(response.web_search_results.is_none());
    }

    #[test]
    fn test_chat_response_full() {
        let json = r#"{
            "response": "WEB_SEARCH_NEEDED: rust 2024 edition",
            "sources": [
                {"text": "Rust editions...", "source": "book.pdf", "page": 3, "score": 0.82},
                {"text": "Snippet", "source": "https://example.com", "page": null, "score": 0.4}
            ],
            "conversation_id": "c1",
            "needs_web_search": true,
            "search_query": "rust 2024 edition",
            "web_search_results": [
                {"title": "Edition guide", "content": "...", "url": "https://example.com",
                 "score": 0.9, "source": "web_search"}
            ],
            "extra_field": 1
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.wants_web_search());
        assert_eq!(response.sources.len(), 2);
        assert_eq!(response.sources[0].page, Some(3));
        assert_eq!(response.sources[1].page, None);
        assert_eq!(response.web_search_results.unwrap()[0].source, "web_search");
    }

    #[test]
    fn test_conversation_history_deserialization() {
        let json = r#"{
            "conversation_id": "c1",
            "messages": [{
                "id": 7,
                "conversation_id": "c1",
                "query": "hi",
                "response": "hello",
                "sources": [],
                "timestamp": "2024-05-01T10:00:00.123456"
            }],
            "created_at": "2024-05-01T10:00:00.123456",
            "updated_at": "2024-05-01T10:00:00.123456"
        }"#;
        let history: ConversationHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.messages.len(), 1);
        assert_eq!(history.messages[0].id, 7);
        assert_eq!(history.created_at.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_conversation_list_sqlite_timestamps() {
        let json = r#"{"conversations": [{
            "conversation_id": "c1",
            "message_count": 2,
            "created_at": "2024-05-01 10:00:00",
            "updated_at": "2024-05-01 10:05:00",
            "first_query": "What does the report say?"
        }]}"#;
        let list: ConversationList = serde_json::from_str(json).unwrap();
        let summary = &list.conversations[0];
        assert_eq!(summary.message_count, 2);
        assert_eq!(
            summary.updated_at,
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(10, 5, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_server_time_parse_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(server_time::parse("2024-05-01T10:00:00"), Some(expected));
        assert_eq!(server_time::parse("2024-05-01 10:00:00"), Some(expected));
        assert_eq!(
            server_time::parse("2024-05-01T12:00:00+02:00"),
            Some(expected)
        );
        assert_eq!(server_time::parse("yesterday"), None);
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let json = r#"{"conversation_id": "c1", "message_count": 1,
            "created_at": "soon", "updated_at": "later"}"#;
        assert!(serde_json::from_str::<ConversationSummary>(json).is_err());
    }

    #[test]
    fn test_delete_response_defaults() {
        let response: DeleteResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response, DeleteResponse::default());
    }

    #[test]
    fn test_health_status_deserialization() {
        let json = r#"{
            "status": "healthy",
            "vector_store_ready": true,
            "web_search_available": false,
            "llm_service_available": true,
            "openai_api_configured": true,
            "tavily_api_configured": false,
            "timestamp": "2024-05-01T10:00:00.5"
        }"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert!(health.is_healthy());
        assert!(health.vector_store_ready);
        assert!(!health.web_search_available);
        assert!(health.timestamp.is_some());
    }

    #[test]
    fn test_health_status_without_timestamp() {
        let health: HealthStatus = serde_json::from_str(r#"{"status": "degraded"}"#).unwrap();
        assert!(!health.is_healthy());
        assert!(health.timestamp.is_none());
    }

    #[test]
    fn test_timestamp_serializes_iso() {
        let history = ConversationSummary {
            conversation_id: "c1".to_string(),
            message_count: 1,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            updated_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_micro_opt(10, 0, 0, 250_000)
                .unwrap(),
            first_query: "hi".to_string(),
        };
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["created_at"], "2024-05-01T10:00:00");
        assert_eq!(json["updated_at"], "2024-05-01T10:00:00.250");
    }
}
