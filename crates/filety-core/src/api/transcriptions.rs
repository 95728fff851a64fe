//! Transcription endpoints: submit, status, recent history, health

use super::{ApiClient, ApiRequest, MultipartBody, UploadFile};
use crate::error::{Error, Result};
use crate::models::{HealthStatus, JobStatusResponse, RecentTranscription, StartResponse};

pub const START_PATH: &str = "/translate/start";
pub const STATUS_PATH: &str = "/translate/status";
pub const RECENT_PATH: &str = "/transcriptions/recent";
pub const HEALTH_PATH: &str = "/health";

impl ApiClient {
    /// Submit a file for transcription and return the job handle
    ///
    /// The bearer token is attached when one is held. No per-request
    /// timeout applies; the workflow deadline bounds the upload.
    pub async fn start_transcription(&self, file: UploadFile, anon_id: &str) -> Result<String> {
        let body = MultipartBody::new()
            .file("file", file)
            .text("anon_uuid", anon_id);
        let request = ApiRequest::post(START_PATH)
            .multipart(body)
            .authenticated()
            .untimed();

        let data: StartResponse = match self.execute(&request).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| Error::protocol(format!("unexpected response from {}: {}", START_PATH, e)))?,
            None => StartResponse::default(),
        };

        data.task_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::protocol("task identifier missing"))
    }

    /// Fetch the current state of a job
    pub async fn transcription_status(&self, task_id: &str) -> Result<JobStatusResponse> {
        let request = ApiRequest::get(STATUS_PATH)
            .query("task_id", task_id)
            .untimed();
        self.call(&request).await
    }

    /// List past transcriptions of the logged-in user, or of the anonymous identity
    pub async fn recent_transcriptions(&self, anon_id: Option<&str>) -> Result<Vec<RecentTranscription>> {
        let mut request = ApiRequest::get(RECENT_PATH).authenticated();
        if let Some(id) = anon_id.filter(|id| !id.trim().is_empty()) {
            request = request.query("anon_uuid", id);
        }

        Ok(self.execute(&request).await?.map(serde_json::from_value).transpose()?.unwrap_or_default())
    }

    /// Check that the API is reachable
    pub async fn health(&self) -> Result<HealthStatus> {
        self.call(&ApiRequest::get(HEALTH_PATH)).await
    }
}
