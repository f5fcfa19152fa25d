pub(crate) mod http_errors;
pub mod rest;
pub mod sdk;

use reqwest::Client;
use std::time::Duration;

use crate::config::{Config, Credentials};
use crate::error::{Error, Result};

pub use rest::RestGenerator;
pub use sdk::{FoundationModel, SdkGenerator};

/// Everything needed to reach the inference service: HTTP client, credentials
/// and endpoint settings. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    client: Client,
    credentials: Credentials,
    iam_token_url: String,
    api_version: String,
    timeout_secs: u64,
}

impl ServiceContext {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.model_timeout_secs))
            .build()
            .map_err(|err| Error::request(format!("Failed to initialize HTTP client: {err}")))?;

        Ok(Self::with_client(client, cfg))
    }

    fn with_client(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            credentials: cfg.credentials.clone(),
            iam_token_url: cfg.iam_token_url.clone(),
            api_version: cfg.api_version.clone(),
            timeout_secs: cfg.model_timeout_secs,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn iam_token_url(&self) -> &str {
        &self.iam_token_url
    }

    pub(crate) fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn generation_url(&self) -> String {
        generation_url(&self.credentials.service_url, &self.api_version)
    }
}

fn generation_url(base_url: &str, api_version: &str) -> String {
    format!(
        "{}/ml/v1-beta/generation/text?version={}",
        base_url.trim_end_matches('/'),
        api_version
    )
}


#[cfg(test)]
mod tests {
    use super::generation_url;

    #[test]
    fn generation_url_trims_trailing_slash_and_adds_version() {
        assert_eq!(
            generation_url("https://us-south.ml.cloud.ibm.com/", "2023-05-29"),
            "https://us-south.ml.cloud.ibm.com/ml/v1-beta/generation/text?version=2023-05-29"
        );
    }
}
