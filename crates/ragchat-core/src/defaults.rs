//! Centralized default constants for ragchat.
//!
//! Endpoint paths, environment variable names, and request defaults shared
//! by the client library and the CLI.

// =============================================================================
// BACKEND
// =============================================================================

/// Default backend base URL (local development server).
pub const API_URL: &str = "http://localhost:8000";

/// Environment variable holding the backend base URL.
pub const ENV_API_URL: &str = "RAGCHAT_API_URL";

/// Environment variable holding an optional whole-request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "RAGCHAT_TIMEOUT_SECS";

// =============================================================================
// QUERY
// =============================================================================

/// Number of retrieved context chunks requested when the caller gives none.
pub const TOP_K: u32 = 5;

// =============================================================================
// UPLOAD
// =============================================================================

/// Multipart form field that carries the uploaded document.
pub const UPLOAD_FIELD: &str = "file";

/// Content type used when the upload's bytes are not recognized.
pub const UPLOAD_FALLBACK_MIME: &str = "application/octet-stream";

// =============================================================================
// ENDPOINTS
// =============================================================================

pub const PATH_UPLOAD: &str = "/upload";
pub const PATH_QUERY: &str = "/query";
pub const PATH_WEB_SEARCH: &str = "/web-search";
pub const PATH_CONVERSATIONS: &str = "/conversations";
pub const PATH_HEALTH: &str = "/health";
