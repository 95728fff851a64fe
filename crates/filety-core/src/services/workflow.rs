//! Upload-and-poll transcription workflow
//!
//! Workflow:
//! 1. Submit the file (multipart) and obtain a job handle
//! 2. Wait the poll interval, then ask for the job status
//! 3. Repeat 2 until the job is `done` or `error`
//!
//! One deadline covers the submit call and the whole poll loop. When it
//! elapses the in-flight request is dropped and the run fails with
//! [`Error::DeadlineExceeded`].
//!
//! The quota pre-flight check is not performed here; see
//! [`Uploader`](super::uploader::Uploader).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, UploadFile};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{AnonymousIdentity, JobStatus, TranscriptionJob};

/// Fallback message when a job fails without an explanation
pub const JOB_FAILED_FALLBACK: &str = "Transcription failed";

// ============================================================================
// States
// ============================================================================

/// Non-terminal phases reported while a run is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPhase {
    Uploading,
    Processing,
}

/// Full state of one upload, terminal states included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    Idle,
    Uploading,
    Processing,
    Done,
    Error,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Done | WorkflowState::Error)
    }

    /// Whether moving to `next` respects the state machine
    ///
    /// `Uploading` is never skipped, `Processing` only follows
    /// `Uploading`, and a finished upload may start over.
    pub fn can_transition_to(&self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        matches!(
            (self, next),
            (Idle | Done | Error, Uploading)
                | (Idle, Error)
                | (Uploading, Processing)
                | (Uploading, Error)
                | (Processing, Done)
                | (Processing, Error)
        )
    }

    /// Move to `next`, rejecting transitions the machine does not allow
    pub fn transition(self, next: WorkflowState) -> Result<WorkflowState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::validation(format!(
                "invalid upload state transition {} -> {}",
                self, next
            )))
        }
    }
}

impl From<UploadPhase> for WorkflowState {
    fn from(phase: UploadPhase) -> Self {
        match phase {
            UploadPhase::Uploading => WorkflowState::Uploading,
            UploadPhase::Processing => WorkflowState::Processing,
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowState::Idle => write!(f, "idle"),
            WorkflowState::Uploading => write!(f, "uploading"),
            WorkflowState::Processing => write!(f, "processing"),
            WorkflowState::Done => write!(f, "done"),
            WorkflowState::Error => write!(f, "error"),
        }
    }
}

// ============================================================================
// Workflow
// ============================================================================

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionOutcome {
    pub task_id: String,
    /// Text as sent by the server; may be missing or empty
    pub transcription: Option<String>,
    /// Number of status requests issued
    pub polls: u32,
}

/// Submits files and polls the resulting jobs
#[derive(Clone)]
pub struct TranscriptionWorkflow {
    client: ApiClient,
    poll_interval: Duration,
    deadline: Duration,
}

impl TranscriptionWorkflow {
    pub fn new(client: ApiClient, config: &ClientConfig) -> Self {
        Self {
            client,
            poll_interval: config.poll_interval,
            deadline: config.deadline,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Transcribe a file on behalf of an anonymous identity
    pub async fn run(&self, file: UploadFile, identity: &AnonymousIdentity) -> Result<TranscriptionOutcome> {
        self.run_with_phases(file, identity, |_| {}).await
    }

    /// Like [`run`](Self::run), reporting each phase change
    ///
    /// `on_phase` is called once with `Uploading` before the submit and once
    /// with `Processing` after a job handle was obtained. It is never called
    /// for the outcome itself.
    pub async fn run_with_phases<F>(
        &self,
        file: UploadFile,
        identity: &AnonymousIdentity,
        mut on_phase: F,
    ) -> Result<TranscriptionOutcome>
    where
        F: FnMut(UploadPhase) + Send,
    {
        let run = self.submit_and_poll(file, &identity.id, &mut on_phase);

        match tokio::time::timeout(self.deadline, run).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!(
                    "[workflow] Gave up after {}s without a result",
                    self.deadline.as_secs()
                );
                Err(Error::DeadlineExceeded(self.deadline))
            }
        }
    }

    async fn submit_and_poll<F>(
        &self,
        file: UploadFile,
        anon_id: &str,
        on_phase: &mut F,
    ) -> Result<TranscriptionOutcome>
    where
        F: FnMut(UploadPhase) + Send,
    {
        on_phase(UploadPhase::Uploading);
        log::info!(
            "[workflow] Uploading {} ({} bytes)",
            file.file_name,
            file.size()
        );

        let task_id = self.client.start_transcription(file, anon_id).await?;
        let mut job = TranscriptionJob::new(task_id);

        on_phase(UploadPhase::Processing);
        log::info!("[workflow] Job {} accepted, polling for result", job.task_id);

        let mut polls = 0u32;
        loop {
            tokio::time::sleep(self.poll_interval).await;

            polls += 1;
            let response = self.client.transcription_status(&job.task_id).await?;
            job.apply(response);

            match job.status {
                JobStatus::Done => {
                    log::info!("[workflow] Job {} done after {} polls", job.task_id, polls);
                    return Ok(TranscriptionOutcome {
                        task_id: job.task_id,
                        transcription: job.result_text,
                        polls,
                    });
                }
                JobStatus::Error => {
                    let message = job
                        .error_message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| JOB_FAILED_FALLBACK.to_string());
                    log::warn!("[workflow] Job {} failed: {}", job.task_id, message);
                    return Err(Error::JobFailed(message));
                }
                JobStatus::Pending => {
                    log::debug!("[workflow] Job {} still processing (poll {})", job.task_id, polls);
                }
            }
        }
    }
}
