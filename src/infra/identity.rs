//! HTTP adapter for the external identity/session provider.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::identity::{Identity, IdentityError, IdentityProvider};
use crate::config::IdentitySettings;
use crate::infra::error::InfraError;

#[derive(Debug, Deserialize)]
struct SessionBody {
    user_id: Uuid,
    username: String,
}

/// Resolves session tokens by asking the identity collaborator over HTTP.
/// The provider owns credentials and sessions; this side only ever sees
/// opaque tokens and the (user id, username) pairs they map to.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    session_endpoint: String,
}

impl HttpIdentityProvider {
    pub fn new(settings: &IdentitySettings) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder().build().map_err(|err| {
            InfraError::configuration(format!("failed to build identity client: {err}"))
        })?;
        let session_endpoint = format!("{}/session", settings.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            session_endpoint,
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, IdentityError> {
        let response = self
            .client
            .get(&self.session_endpoint)
            .query(&[("token", token)])
            .send()
            .await
            .map_err(|err| IdentityError::Unavailable(err.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::OK => {
                let body: SessionBody = response
                    .json()
                    .await
                    .map_err(|err| IdentityError::Unavailable(err.to_string()))?;
                Ok(Some(Identity {
                    user_id: body.user_id,
                    username: body.username,
                }))
            }
            status => Err(IdentityError::Unavailable(format!(
                "identity provider returned {status}"
            ))),
        }
    }
}
