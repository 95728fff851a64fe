//! Data models
//!
//! Domain types used across the crate, plus the wire shapes returned by
//! the API. Wire types are converted into domain types at the `api` layer.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Anonymous identity
// ============================================================================

/// Server-registered identifier tracking unauthenticated usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymousIdentity {
    /// Stable UUID issued by the server
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Seconds of audio transcribed today
    pub used_seconds: i64,
    /// Daily allowance in seconds
    pub limit_seconds: i64,
}

/// Response of `POST /auth/anonymous`
#[derive(Debug, Clone, Deserialize)]
pub struct AnonUserResponse {
    pub uuid: String,
    pub created_at: String,
    pub daily_used_time: i64,
    pub daily_limit_time: i64,
}

impl TryFrom<AnonUserResponse> for AnonymousIdentity {
    type Error = Error;

    fn try_from(data: AnonUserResponse) -> Result<Self> {
        if data.uuid.trim().is_empty() {
            return Err(Error::protocol("anonymous identity has an empty uuid"));
        }
        Ok(Self {
            id: data.uuid,
            created_at: parse_server_timestamp(&data.created_at)?,
            used_seconds: data.daily_used_time,
            limit_seconds: data.daily_limit_time,
        })
    }
}

// ============================================================================
// Authenticated user
// ============================================================================

/// Subscription tier of a registered user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffPlan {
    Free,
    Plus,
    Pro,
    Premium,
}

impl TariffPlan {
    /// Map the numeric plan code sent by the server; unknown codes are Free
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => TariffPlan::Plus,
            2 => TariffPlan::Pro,
            3 => TariffPlan::Premium,
            _ => TariffPlan::Free,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            TariffPlan::Free => 0,
            TariffPlan::Plus => 1,
            TariffPlan::Pro => 2,
            TariffPlan::Premium => 3,
        }
    }
}

impl std::fmt::Display for TariffPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TariffPlan::Free => write!(f, "free"),
            TariffPlan::Plus => write!(f, "plus"),
            TariffPlan::Pro => write!(f, "pro"),
            TariffPlan::Premium => write!(f, "premium"),
        }
    }
}

/// A registered, logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub tariff_plan: TariffPlan,
    /// Seconds of audio transcribed today
    pub daily_used_seconds: i64,
}

/// User record returned by `/auth/register` and `/auth/me`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: i64,
    pub email: String,
    pub created_at: String,
    #[serde(default)]
    pub tariff_plan: i64,
    #[serde(default)]
    pub daily_used_time: i64,
}

impl TryFrom<ApiUser> for AuthenticatedUser {
    type Error = Error;

    fn try_from(data: ApiUser) -> Result<Self> {
        Ok(Self {
            id: data.id,
            email: data.email,
            created_at: parse_server_timestamp(&data.created_at)?,
            tariff_plan: TariffPlan::from_code(data.tariff_plan),
            daily_used_seconds: data.daily_used_time,
        })
    }
}

/// Response of `/auth/login` and `/auth/refresh`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

// ============================================================================
// Transcription jobs
// ============================================================================

/// Status of a transcription job as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Anything that is not terminal
    Pending,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "done" => JobStatus::Done,
            "error" => JobStatus::Error,
            _ => JobStatus::Pending,
        }
    }
}

/// A job handle and its latest known state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionJob {
    pub task_id: String,
    pub status: JobStatus,
    pub result_text: Option<String>,
    pub error_message: Option<String>,
}

impl TranscriptionJob {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: JobStatus::Pending,
            result_text: None,
            error_message: None,
        }
    }

    /// Apply one status response
    pub fn apply(&mut self, response: JobStatusResponse) {
        self.status = JobStatus::from(response.status.as_str());
        self.result_text = response.transcription;
        self.error_message = response.error;
    }
}

/// Response of `POST /translate/start`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartResponse {
    pub task_id: Option<String>,
}

/// Response of `GET /translate/status`
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub status: String,
    pub transcription: Option<String>,
    pub error: Option<String>,
}

/// Entry of `GET /transcriptions/recent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTranscription {
    pub id: i64,
    pub created_at: String,
    pub status: String,
    #[serde(default)]
    pub text: String,
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse a server timestamp, with or without a UTC offset
///
/// Naive timestamps are taken as UTC.
pub fn parse_server_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(Error::protocol(format!("invalid timestamp '{}'", raw)))
}
