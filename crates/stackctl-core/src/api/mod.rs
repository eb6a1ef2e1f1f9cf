//! Thin typed client for the management API

pub mod client;
pub mod error;
pub mod models;

pub use client::{ApiClient, ApiClientBuilder, DEFAULT_API_URL, USER_AGENT};
pub use error::ApiError;
pub use models::*;
