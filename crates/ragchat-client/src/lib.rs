//! # ragchat-client
//!
//! HTTP client for the ragchat document assistant backend.
//!
//! This crate provides:
//! - [`ApiClient`], a reqwest-based implementation of [`ChatApi`]
//! - [`ClientConfig`], read once from the environment or built explicitly
//! - [`middleware::normalize_response`], which turns server `detail`
//!   messages into [`Error::Api`] and leaves every other failure untouched
//!
//! # Example
//!
//! ```rust,no_run
//! use ragchat_client::{ApiClient, ChatApi, QueryRequest};
//!
//! #[tokio::main]
//! async fn main() -> ragchat_client::Result<()> {
//!     let client = ApiClient::from_env()?;
//!     let answer = client.send_query(QueryRequest::new("Summarize the report")).await?;
//!     println!("{}", answer.response);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod middleware;

// Re-export core types
pub use ragchat_core::*;

pub use client::ApiClient;
pub use config::ClientConfig;
