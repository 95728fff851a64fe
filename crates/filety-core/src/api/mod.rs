//! Filety API client
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ auth / anonymous / transcriptions (endpoint wrappers)   │
//! └─────────────────────────────────────────────────────────┘
//!          │
//!          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │ ApiClient                                               │
//! │   - bearer attachment                                   │
//! │   - 401 → single-flight refresh → one retry             │
//! │   - error message extraction                            │
//! └─────────────────────────────────────────────────────────┘
//!          │                               │
//!          ▼                               ▼
//! ┌──────────────────┐          ┌─────────────────────────┐
//! │ TokenStore       │          │ trait Transport         │
//! │ (memory only)    │          │   ReqwestTransport      │
//! └──────────────────┘          └─────────────────────────┘
//! ```

pub mod anonymous;
pub mod auth;
pub mod client;
pub mod message;
pub mod session;
pub mod transcriptions;
pub mod transport;

use reqwest::Method;
use serde::Serialize;

pub use client::ApiClient;
pub use message::{extract_error_code, extract_error_message};
pub use session::TokenStore;
pub use transport::{HttpResponse, ReqwestTransport, Transport};

use crate::error::Result;

// ============================================================================
// Request description
// ============================================================================

/// A file to upload as a multipart part
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk, guessing an audio/video MIME type from the extension
    pub async fn from_path(path: &std::path::Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        let mut file = Self::new(file_name, bytes);
        if let Some(mime) = guess_media_type(path) {
            file = file.with_mime_type(mime);
        }
        Ok(file)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

fn guess_media_type(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "webm" => "video/webm",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        _ => return None,
    };
    Some(mime)
}

/// Multipart form: text fields plus an optional file part
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub file: Option<(String, UploadFile)>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: UploadFile) -> Self {
        self.file = Some((name.into(), file));
        self
    }

    /// Value of a text field, if present
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Body of an outgoing request
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

/// An API call, independent of the HTTP library doing the exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Attach the bearer token and allow refresh-and-retry on 401
    pub auth: bool,
    /// Cap the exchange with the configured per-request timeout
    ///
    /// Off for calls whose duration is bounded by the caller, such as the
    /// transcription workflow under its own deadline.
    pub timed: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            auth: false,
            timed: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Serialize a JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    pub fn authenticated(mut self) -> Self {
        self.auth = true;
        self
    }

    pub fn untimed(mut self) -> Self {
        self.timed = false;
        self
    }

    /// Value of a query parameter, if present
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/translate/status")
            .query("task_id", "abc")
            .authenticated();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.query_value("task_id"), Some("abc"));
        assert!(request.auth);
        assert!(request.timed);
        assert_eq!(request.body, RequestBody::Empty);
    }

    #[test]
    fn test_untimed_request() {
        let request = ApiRequest::post("/translate/start").untimed();
        assert!(!request.timed);
    }

    #[test]
    fn test_json_body() {
        let request = ApiRequest::post("/auth/anonymous")
            .json(&serde_json::json!({ "uuid": null }))
            .unwrap();
        assert!(!request.auth);
        assert_eq!(
            request.body,
            RequestBody::Json(serde_json::json!({ "uuid": null }))
        );
    }

    #[test]
    fn test_multipart_fields() {
        let body = MultipartBody::new()
            .file("file", UploadFile::new("a.mp3", vec![1, 2, 3]))
            .text("anon_uuid", "u-1");
        assert_eq!(body.field("anon_uuid"), Some("u-1"));
        assert_eq!(body.file.as_ref().map(|(_, f)| f.size()), Some(3));
    }

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type(std::path::Path::new("talk.MP3")), Some("audio/mpeg"));
        assert_eq!(guess_media_type(std::path::Path::new("clip.mov")), Some("video/quicktime"));
        assert_eq!(guess_media_type(std::path::Path::new("notes.txt")), None);
    }
}
