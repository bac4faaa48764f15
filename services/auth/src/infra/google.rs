use std::time::Duration;

use anyhow::Context as _;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;

use crate::domain::repository::ExternalIdentityPort;
use crate::domain::types::ExternalProfile;
use crate::error::AuthServiceError;

/// Subset of the OpenID userinfo document Google returns.
#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    email_verified: Option<bool>,
    given_name: Option<String>,
    family_name: Option<String>,
}

/// Resolves Google OAuth access tokens through the userinfo endpoint.
/// One request per call, never retried.
#[derive(Clone)]
pub struct GoogleIdentityClient {
    http: reqwest::Client,
    userinfo_url: String,
}

impl GoogleIdentityClient {
    pub fn new(userinfo_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build google http client")?;
        Ok(Self {
            http,
            userinfo_url: userinfo_url.into(),
        })
    }
}

impl ExternalIdentityPort for GoogleIdentityClient {
    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, AuthServiceError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "google userinfo request failed");
                AuthServiceError::ExternalAuth
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%status, "google userinfo rejected token");
            return Err(AuthServiceError::ExternalAuth);
        }

        let info: UserInfo = response.json().await.map_err(|e| {
            warn!(error = %e, "unreadable google userinfo response");
            AuthServiceError::ExternalAuth
        })?;

        if info.email_verified == Some(false) {
            warn!("google account email not verified");
            return Err(AuthServiceError::ExternalAuth);
        }
        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or(AuthServiceError::ExternalAuth)?;

        Ok(ExternalProfile {
            email,
            given_name: info.given_name,
            family_name: info.family_name,
        })
    }
}
