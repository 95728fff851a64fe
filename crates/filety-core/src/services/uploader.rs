//! Caller-side orchestration of one upload
//!
//! Refreshes the quota, refuses to start when it is depleted, runs the
//! workflow while reporting every state, then schedules a background
//! usage refresh.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::task::JoinHandle;

use super::identity_store::IdentityStore;
use super::tracker::UsageTracker;
use super::workflow::{TranscriptionWorkflow, WorkflowState};
use crate::api::anonymous::ANON_IDENTITY_FAILED;
use crate::api::{ApiClient, UploadFile};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::RecentTranscription;

/// Shown when the quota is already depleted before an upload
pub const LIMIT_MESSAGE: &str =
    "The recording exceeds your available quota. Shorten the file or upgrade your plan to continue.";

/// Shown when the server rejects a file for exceeding the daily limit
pub const DAILY_LIMIT_MESSAGE: &str =
    "The file does not fit into your remaining quota. Shorten the recording or upgrade your plan.";

/// Shown instead of an empty transcription
pub const EMPTY_RESULT_PLACEHOLDER: &str = "No text recognized. Try another file.";

/// Structured code sent by the server for a daily limit rejection
pub const DAILY_LIMIT_CODE: &str = "daily_limit_exceeded";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub task_id: String,
    pub text: String,
    /// True when `text` is the placeholder rather than recognized speech
    pub placeholder: bool,
}

pub struct Uploader {
    tracker: UsageTracker,
    workflow: TranscriptionWorkflow,
    pending_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl Uploader {
    pub fn new(client: ApiClient, config: &ClientConfig, store: Arc<dyn IdentityStore>) -> Self {
        Self {
            tracker: UsageTracker::new(client.clone(), store),
            workflow: TranscriptionWorkflow::new(client, config),
            pending_refresh: Mutex::new(None),
        }
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    pub fn client(&self) -> &ApiClient {
        self.tracker.client()
    }

    /// Transcribe a file, reporting each state to `observer`
    ///
    /// The observer sees `Uploading` and `Processing` while the workflow
    /// runs, then exactly one of `Done` or `Error`. A depleted quota fails
    /// before anything is uploaded.
    pub async fn transcribe<F>(&self, file: UploadFile, mut observer: F) -> Result<TranscriptionResult>
    where
        F: FnMut(WorkflowState) + Send,
    {
        if let Err(e) = self.tracker.refresh().await {
            log::warn!("[uploader] Usage refresh failed, using cached records: {}", e);
        }
        let records = self.tracker.records().await;

        let Some(identity) = records.anon.clone() else {
            observer(WorkflowState::Error);
            return Err(Error::transport(ANON_IDENTITY_FAILED));
        };

        if records.snapshot().is_some_and(|s| s.is_depleted()) {
            log::info!("[uploader] Quota depleted, not uploading {}", file.file_name);
            observer(WorkflowState::Error);
            return Err(Error::QuotaExceeded(LIMIT_MESSAGE.to_string()));
        }

        let mut state = WorkflowState::Idle;
        let outcome = self
            .workflow
            .run_with_phases(file, &identity, |phase| {
                state = advance(state, phase.into());
                observer(state);
            })
            .await;

        self.schedule_refresh();

        match outcome {
            Ok(outcome) => {
                observer(advance(state, WorkflowState::Done));
                let text = outcome
                    .transcription
                    .filter(|t| !t.trim().is_empty());
                Ok(TranscriptionResult {
                    task_id: outcome.task_id,
                    placeholder: text.is_none(),
                    text: text.unwrap_or_else(|| EMPTY_RESULT_PLACEHOLDER.to_string()),
                })
            }
            Err(e) => {
                observer(advance(state, WorkflowState::Error));
                Err(e)
            }
        }
    }

    /// Recent transcriptions of the current user or identity, newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<RecentTranscription>> {
        let anon_id = self.tracker.anon_id().await;
        let mut items = self.client().recent_transcriptions(anon_id.as_deref()).await?;
        items.truncate(limit);
        Ok(items)
    }

    /// Wait for the background refresh started by the last upload, if any
    pub async fn settle(&self) {
        let handle = match self.pending_refresh.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                log::warn!("[uploader] Background refresh task aborted: {}", e);
            }
        }
    }

    fn schedule_refresh(&self) {
        let handle = self.tracker.spawn_refresh();
        if let Ok(mut slot) = self.pending_refresh.lock() {
            *slot = Some(handle);
        }
    }
}

fn advance(current: WorkflowState, next: WorkflowState) -> WorkflowState {
    match current.transition(next) {
        Ok(state) => state,
        Err(e) => {
            log::warn!("[uploader] {}", e);
            next
        }
    }
}

/// Message to show a person for a failed upload
pub fn friendly_error(err: &Error) -> String {
    if let Error::QuotaExceeded(message) = err {
        return message.clone();
    }
    if err.code() == Some(DAILY_LIMIT_CODE) {
        return DAILY_LIMIT_MESSAGE.to_string();
    }

    let message = err.user_message();
    if message.to_lowercase().contains("daily limit") {
        DAILY_LIMIT_MESSAGE.to_string()
    } else {
        message
    }
}
