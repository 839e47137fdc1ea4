//! Identity-provider client.
//!
//! Two opaque remote calls: create-user-by-email and lookup-user-by-email.
//! The provider assigns the uid that becomes the owner filter value for
//! every record the user writes.

use serde::Deserialize;
use tally_config::IdentitySettings;
use tally_types::UserId;

use crate::{ClientError, error_for_status, http_client};

/// A provisioned user, as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub uid: UserId,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct IdentityClient {
    settings: IdentitySettings,
}

impl IdentityClient {
    #[must_use]
    pub fn new(settings: IdentitySettings) -> Self {
        Self { settings }
    }

    fn users_url(&self) -> String {
        format!("{}/v1/users", self.settings.url.trim_end_matches('/'))
    }

    /// Look up an existing user. An unknown email is `None`, not an error;
    /// the login screen offers sign-up in that case.
    pub async fn lookup_user(&self, email: &str) -> Result<Option<User>, ClientError> {
        let response = http_client()
            .get(self.users_url())
            .bearer_auth(self.settings.api_key.expose_secret())
            .query(&[("email", email)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_for_status(response, None).await);
        }

        let user: User = response.json().await?;
        tracing::debug!(uid = %user.uid, "Resolved user");
        Ok(Some(user))
    }

    /// Create a user for this email. The provider enforces uniqueness.
    pub async fn create_user(&self, email: &str) -> Result<User, ClientError> {
        let body = serde_json::json!({ "email": email });
        let response = http_client()
            .post(self.users_url())
            .bearer_auth(self.settings.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status(response, None).await);
        }

        let user: User = response.json().await?;
        tracing::info!(uid = %user.uid, "Created user");
        Ok(user)
    }
}
