use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::Error;

fn error_chain_matches(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if source
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io_err| io_err.kind() == kind)
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn generation_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> Error {
    if err.is_timeout() || error_chain_matches(&err, ErrorKind::TimedOut, "timed out") {
        return Error::request(format!(
            "Generation request timed out after {timeout_secs}s while calling '{api_url}'. \
             Increase MODEL_TIMEOUT_SECS or check service responsiveness."
        ));
    }

    if err.is_connect() {
        if error_chain_matches(&err, ErrorKind::ConnectionRefused, "connection refused") {
            return Error::request(format!(
                "Connection refused by inference service at '{api_url}'. \
                 Check that IBM_CLOUD_URL is correct."
            ));
        }

        return Error::request(format!(
            "Failed to connect to inference service at '{api_url}'. \
             Check IBM_CLOUD_URL and network connectivity."
        ));
    }

    Error::request(format!("Failed to call inference service at '{api_url}': {err}"))
}
