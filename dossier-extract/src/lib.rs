//! dossier-extract: AI document extraction with prioritized model fallback.

pub mod client;
pub mod error;
pub mod payload;
pub mod schema;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_MODEL_PRIORITY, Extractor, FieldMap, GeminiBackend, GenerateBackend,
    GenerateRequest, RetryPolicy,
};
pub use error::ExtractError;
pub use payload::DocumentPayload;
pub use schema::{CategorySpec, spec_for};
