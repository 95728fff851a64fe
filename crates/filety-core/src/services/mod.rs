//! Services module

pub mod identity_store;
pub mod tracker;
pub mod uploader;
pub mod usage;
pub mod workflow;

pub use identity_store::{FileIdentityStore, IdentityStore, MemoryIdentityStore};
pub use tracker::{UsageRecords, UsageTracker};
pub use uploader::{
    friendly_error, TranscriptionResult, Uploader, DAILY_LIMIT_MESSAGE, EMPTY_RESULT_PLACEHOLDER,
    LIMIT_MESSAGE,
};
pub use usage::{
    compute_remaining, daily_limit_for_plan, format_duration, is_depleted, UsageSnapshot,
    UsageSource,
};
pub use workflow::{TranscriptionOutcome, TranscriptionWorkflow, UploadPhase, WorkflowState};
