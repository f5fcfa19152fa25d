use std::env;
use std::fmt;

use crate::error::{Error, Result};

pub const API_KEY_VAR: &str = "API_KEY";
pub const SERVICE_URL_VAR: &str = "IBM_CLOUD_URL";
pub const PROJECT_ID_VAR: &str = "PROJECT_ID";

const DEFAULT_IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";
const DEFAULT_API_VERSION: &str = "2023-05-29";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_FORM_BIND_ADDR: &str = "127.0.0.1:8501";

/// Service credentials. Loaded once and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub service_url: String,
    pub project_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("service_url", &self.service_url)
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Every required variable is checked before failing so the error can
    /// name all of the missing ones at once.
    pub(crate) fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| match non_blank(get_var(key)) {
            Some(value) => value,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let api_key = required(API_KEY_VAR);
        let service_url = required(SERVICE_URL_VAR);
        let project_id = required(PROJECT_ID_VAR);

        if !missing.is_empty() {
            return Err(Error::Config { missing });
        }

        Ok(Self {
            api_key,
            service_url,
            project_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub iam_token_url: String,
    pub api_version: String,
    pub model_timeout_secs: u64,
    pub form_bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let credentials = Credentials::from_env_with(&mut get_var)?;

        Ok(Self {
            credentials,
            iam_token_url: non_blank(get_var("IAM_TOKEN_URL"))
                .unwrap_or_else(|| DEFAULT_IAM_TOKEN_URL.to_string()),
            api_version: non_blank(get_var("WML_API_VERSION"))
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            model_timeout_secs: parse_model_timeout_secs(get_var("MODEL_TIMEOUT_SECS").as_deref()),
            form_bind_addr: non_blank(get_var("FORM_BIND_ADDR"))
                .unwrap_or_else(|| DEFAULT_FORM_BIND_ADDR.to_string()),
        })
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_model_timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS)
}
