use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Short-lived bearer token issued by the IAM identity endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AuthToken {
    pub fn new(access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    expiration: Option<i64>,
}

/// Exchanges `api_key` for a bearer token. One call, no caching, no retry.
pub async fn fetch_token(client: &Client, token_url: &str, api_key: &str) -> Result<AuthToken> {
    debug!(token_url = %token_url, "requesting IAM bearer token");

    let response = client
        .post(token_url)
        .header(ACCEPT, "application/json")
        .form(&[("grant_type", APIKEY_GRANT_TYPE), ("apikey", api_key)])
        .send()
        .await
        .map_err(|err| {
            warn!(token_url = %token_url, error = %err, "IAM token request failed");
            Error::auth(format!("could not reach token endpoint '{token_url}': {err}"))
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            token_url = %token_url,
            status = %status,
            response_body_len = body.len(),
            "IAM token endpoint returned non-success status"
        );
        return Err(Error::auth(format!(
            "token endpoint returned status {status}: {body}"
        )));
    }

    let parsed: IamTokenResponse = response
        .json()
        .await
        .map_err(|err| Error::auth(format!("token response missing access_token: {err}")))?;

    let expires_at = parsed
        .expiration
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    debug!(expires_at = ?expires_at, "received IAM bearer token");

    Ok(AuthToken::new(parsed.access_token, expires_at))
}
