//! # ragchat-core
//!
//! Core types, routes, and traits for the ragchat document assistant.
//!
//! This crate provides the view route table, the request and response
//! models exchanged with the chat backend, the shared error type, and the
//! [`ChatApi`] trait that HTTP clients implement.

pub mod defaults;
pub mod error;
pub mod models;
pub mod routes;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use routes::Route;
pub use traits::ChatApi;
