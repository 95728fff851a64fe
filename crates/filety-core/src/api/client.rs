//! Authenticated request client
//!
//! Wraps every outbound call with bearer attachment, refresh-and-retry on
//! 401, and error message extraction.
//!
//! # Token refresh
//!
//! Concurrent callers that hit a 401 share one refresh: the first caller
//! stores a [`Shared`] future in the refresh slot, later callers clone it,
//! and everybody awaits the same result. The slot is emptied once the
//! refresh settles, so the next 401 starts a fresh refresh.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use super::auth::REFRESH_PATH;
use super::message::{extract_error_code, extract_error_message};
use super::session::TokenStore;
use super::transport::{HttpResponse, ReqwestTransport, Transport};
use super::ApiRequest;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::TokenResponse;

type RefreshFuture = Shared<BoxFuture<'static, Result<String>>>;

/// Request client shared by every API wrapper
///
/// Cloning is cheap: clones share the transport, the token store and the
/// refresh slot.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenStore>,
    refresh_slot: Arc<Mutex<Option<RefreshFuture>>>,
}

impl ApiClient {
    /// Create a client talking to the configured API over HTTP
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client on top of any transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            tokens: Arc::new(TokenStore::new()),
            refresh_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Token store owned by this client
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Whether an access token is currently held
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated().await
    }

    /// Execute a request and return the decoded JSON body, if any
    ///
    /// A 2xx response with no body, a 204, or a non-JSON body yields
    /// `Ok(None)`.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Option<Value>> {
        let mut retried = false;

        loop {
            let bearer = if request.auth {
                self.tokens.get().await
            } else {
                None
            };

            let response = self.transport.send(request, bearer.as_deref()).await?;

            if response.is_success() {
                return Ok(parse_success_body(&response));
            }

            if response.status == 401 && request.auth {
                let message = extract_error_message(response.status, &response.body);
                if retried {
                    log::warn!(
                        "[api:client] {} rejected again after token refresh: {}",
                        request.path,
                        message
                    );
                    return Err(Error::Unauthorized(message));
                }

                log::debug!("[api:client] {} returned 401, refreshing token", request.path);
                retried = true;
                self.recover_rejected_token(bearer.as_deref()).await?;
                continue;
            }

            let err = http_error(&response);
            log::debug!("[api:client] {} failed: {}", request.path, err);
            return Err(err);
        }
    }

    /// Execute a request and deserialize its body
    pub async fn call<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let value = self.execute(request).await?.ok_or_else(|| {
            Error::protocol(format!("empty response from {}", request.path))
        })?;

        serde_json::from_value(value).map_err(|e| {
            Error::protocol(format!("unexpected response from {}: {}", request.path, e))
        })
    }

    /// Execute a request whose body is irrelevant
    pub async fn call_empty(&self, request: &ApiRequest) -> Result<()> {
        self.execute(request).await.map(|_| ())
    }

    /// Refresh the access token, joining a refresh already in flight
    pub async fn refresh_access_token(&self) -> Result<String> {
        let refresh = {
            let mut slot = self.refresh_slot.lock().await;
            match slot.as_ref() {
                Some(in_flight) => {
                    log::debug!("[api:client] Joining in-flight token refresh");
                    in_flight.clone()
                }
                None => {
                    let fut = perform_refresh(self.transport.clone(), self.tokens.clone())
                        .boxed()
                        .shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        let result = refresh.clone().await;

        let mut slot = self.refresh_slot.lock().await;
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&refresh)) {
            *slot = None;
        }

        result
    }

    /// After a 401, get a token worth retrying with
    ///
    /// When the held token already differs from the rejected one, another
    /// caller rotated it in the meantime and no new refresh is needed.
    async fn recover_rejected_token(&self, rejected: Option<&str>) -> Result<String> {
        if let Some(current) = self.tokens.get().await {
            if rejected != Some(current.as_str()) {
                log::debug!("[api:client] Token was rotated concurrently, retrying with it");
                return Ok(current);
            }
        }

        self.refresh_access_token().await
    }
}

async fn perform_refresh(transport: Arc<dyn Transport>, tokens: Arc<TokenStore>) -> Result<String> {
    log::info!("[api:client] Refreshing access token");

    let request = ApiRequest::post(REFRESH_PATH);
    let outcome = async {
        let response = transport.send(&request, None).await?;

        if !response.is_success() {
            let err = if response.status == 401 {
                Error::Unauthorized(extract_error_message(response.status, &response.body))
            } else {
                http_error(&response)
            };
            return Err(err);
        }

        let data: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::protocol(format!("invalid refresh response: {}", e)))?;

        if data.access_token.is_empty() {
            return Err(Error::protocol("refresh response has no access_token"));
        }

        Ok(data.access_token)
    }
    .await;

    match outcome {
        Ok(token) => {
            tokens.set(token.clone()).await;
            log::info!("[api:client] Access token refreshed");
            Ok(token)
        }
        Err(err) => {
            log::warn!("[api:client] Token refresh failed: {}", err);
            tokens.clear().await;
            Err(err)
        }
    }
}

/// Build the typed error for a non-2xx response
pub(crate) fn http_error(response: &HttpResponse) -> Error {
    Error::Http {
        status: response.status,
        message: extract_error_message(response.status, &response.body),
        code: extract_error_code(&response.body),
    }
}

fn parse_success_body(response: &HttpResponse) -> Option<Value> {
    if response.status == 204 || response.body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(&response.body) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("[api:client] Ignoring non-JSON success body: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_body() {
        assert_eq!(parse_success_body(&HttpResponse::new(204, "{}")), None);
        assert_eq!(parse_success_body(&HttpResponse::new(200, "")), None);
        assert_eq!(parse_success_body(&HttpResponse::new(200, "<html>")), None);
        assert_eq!(
            parse_success_body(&HttpResponse::new(200, r#"{"ok":true}"#)),
            Some(serde_json::json!({ "ok": true }))
        );
    }

    #[test]
    fn test_http_error_carries_code() {
        let err = http_error(&HttpResponse::new(
            403,
            r#"{"detail":{"msg":"daily limit exceeded","code":"daily_limit_exceeded"}}"#,
        ));
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.code(), Some("daily_limit_exceeded"));
        assert_eq!(err.user_message(), "daily limit exceeded");
    }
}
