//! Anonymous identity endpoint

use serde::Serialize;

use super::{ApiClient, ApiRequest};
use crate::error::{Error, Result};
use crate::models::{AnonUserResponse, AnonymousIdentity};

pub const ANONYMOUS_PATH: &str = "/auth/anonymous";

/// Generic message used when the identity cannot be obtained
pub const ANON_IDENTITY_FAILED: &str = "Could not establish anonymous identity";

#[derive(Debug, Serialize)]
struct AnonUserRequest<'a> {
    uuid: Option<&'a str>,
}

impl ApiClient {
    /// Register a new anonymous identity or fetch the counters of an existing one
    ///
    /// A blank `existing_id` is sent as `null` and the server mints a new
    /// identifier. Nothing is cached: every call is a round trip.
    pub async fn establish_anonymous(&self, existing_id: Option<&str>) -> Result<AnonymousIdentity> {
        let uuid = existing_id.filter(|id| !id.trim().is_empty());
        let request = ApiRequest::post(ANONYMOUS_PATH).json(&AnonUserRequest { uuid })?;

        let outcome = async {
            let data: AnonUserResponse = self.call(&request).await?;
            AnonymousIdentity::try_from(data)
        }
        .await;

        match outcome {
            Ok(identity) => {
                if uuid.is_some_and(|sent| sent != identity.id) {
                    log::info!(
                        "[api:anonymous] Server replaced unknown identity with {}",
                        identity.id
                    );
                }
                log::debug!(
                    "[api:anonymous] Identity {} used {}s of {}s",
                    identity.id,
                    identity.used_seconds,
                    identity.limit_seconds
                );
                Ok(identity)
            }
            // HTTP failures keep the server's message and status
            Err(err @ Error::Http { .. }) => {
                log::warn!("[api:anonymous] Server rejected identity request: {}", err);
                Err(err)
            }
            Err(err) => {
                log::warn!("[api:anonymous] Identity request failed: {}", err);
                Err(Error::transport(ANON_IDENTITY_FAILED))
            }
        }
    }
}
