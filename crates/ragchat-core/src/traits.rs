//! Core traits for ragchat abstractions.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

/// Remote operations offered by the chat backend.
///
/// Implementations translate each call into one request/response exchange
/// and hold no state between calls beyond their configuration.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Upload a PDF document for ingestion.
    async fn upload_pdf(&self, file: UploadFile) -> Result<UploadResponse>;

    /// Ask the assistant a question, optionally within a conversation.
    async fn send_query(&self, request: QueryRequest) -> Result<ChatResponse>;

    /// Approve or decline the web search the assistant asked for.
    async fn perform_web_search(
        &self,
        conversation_id: &str,
        approved: bool,
    ) -> Result<ChatResponse>;

    /// Fetch every exchange of one conversation.
    async fn get_conversation_history(&self, conversation_id: &str)
        -> Result<ConversationHistory>;

    /// List all conversations, most recently updated first.
    async fn get_all_conversations(&self) -> Result<ConversationList>;

    /// Remove a conversation.
    async fn delete_conversation(&self, conversation_id: &str) -> Result<DeleteResponse>;

    /// Report backend readiness.
    async fn health_check(&self) -> Result<HealthStatus>;
}
