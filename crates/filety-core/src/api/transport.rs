//! HTTP transport
//!
//! The request client talks to the network only through [`Transport`], so
//! tests can script server responses without a socket.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};

use super::{ApiRequest, RequestBody};
use crate::config::ClientConfig;
use crate::error::Result;

/// Raw HTTP response: status plus undecoded body text
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Upper bound for establishing a connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `User-Agent` sent with every request
pub fn user_agent() -> String {
    format!("filety/{}", crate::VERSION)
}

/// Performs one HTTP exchange
///
/// Implementations must not interpret the status code: any response that
/// arrived maps to `Ok`, only transport failures map to `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<HttpResponse>;
}

/// [`Transport`] backed by `reqwest`
///
/// Keeps an in-memory cookie jar so the refresh cookie set by
/// `/auth/login` is sent back to `/auth/refresh`.
///
/// The client itself has no total timeout. Requests marked `timed` get the
/// configured per-request timeout; the others run until the caller drops
/// them.
pub struct ReqwestTransport {
    client: Client,
    config: ClientConfig,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .cookie_store(true)
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            client,
            config: config.clone().validate()?,
        })
    }

    fn build_form(body: &super::MultipartBody) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();

        if let Some((name, file)) = &body.file {
            let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(mime) = &file.mime_type {
                part = part.mime_str(mime)?;
            }
            form = form.part(name.clone(), part);
        }

        for (name, value) in &body.fields {
            form = form.text(name.clone(), value.clone());
        }

        Ok(form)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<HttpResponse> {
        let url = self.config.url(&request.path);
        log::debug!("[api:transport] {} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header("Accept", "application/json");

        if request.timed {
            builder = builder.timeout(self.config.request_timeout);
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        builder = match &request.body {
            RequestBody::Empty => builder.header("Content-Type", "application/json"),
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(body) => builder.multipart(Self::build_form(body)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        log::debug!(
            "[api:transport] {} {} -> {} ({} bytes)",
            request.method,
            request.path,
            status,
            body.len()
        );

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MultipartBody, UploadFile};

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
    }

    #[test]
    fn test_user_agent_carries_crate_version() {
        let agent = user_agent();
        let version = agent.strip_prefix("filety/").unwrap();
        assert_eq!(version, crate::version());
        assert_eq!(version.split('.').count(), 3);
    }

    #[test]
    fn test_transport_builds_with_default_config() {
        assert!(ReqwestTransport::new(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_transport_normalizes_base_url() {
        let transport = ReqwestTransport::new(&ClientConfig::with_base_url("http://localhost:8000/")).unwrap();
        assert_eq!(transport.config.url("/health"), "http://localhost:8000/health");

        assert!(ReqwestTransport::new(&ClientConfig::with_base_url("localhost:8000")).is_err());
    }

    #[test]
    fn test_build_form_rejects_invalid_mime() {
        let body = MultipartBody::new()
            .file("file", UploadFile::new("a.mp3", vec![0]).with_mime_type("not a mime"));
        assert!(ReqwestTransport::build_form(&body).is_err());
    }
}
