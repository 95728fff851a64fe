//! # filety-core
//!
//! Client logic for the Filety transcription service, shared by the CLI.
//!
//! This crate provides:
//! - HTTP access with bearer tokens and single-flight refresh (`api` module)
//! - Data models (`models` module)
//! - Quota calculation and the upload workflow (`services` module)
//! - Client configuration (`config` module)
//! - Unified error handling (`error` module)

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

// Re-exports for convenience
pub use api::{ApiClient, TokenStore, Transport, UploadFile};
pub use config::ClientConfig;
pub use error::{Error, Result};

// Re-export commonly used types from models
pub use models::{
    AnonymousIdentity, AuthenticatedUser, HealthStatus, JobStatus, RecentTranscription,
    TariffPlan,
};

// Re-export commonly used types from services
pub use services::{
    compute_remaining, friendly_error, is_depleted, FileIdentityStore, IdentityStore,
    MemoryIdentityStore, TranscriptionOutcome, TranscriptionResult, TranscriptionWorkflow,
    Uploader, UsageSnapshot, UsageTracker, WorkflowState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}
