use thiserror::Error;

/// Failures surfaced by credential loading, token exchange and generation calls.
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Missing required environment variable(s): {}. Set them in the environment or a .env file",
        .missing.join(", ")
    )]
    Config { missing: Vec<&'static str> },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Request(String),

    #[error("Unexpected generation response: {0}")]
    ResponseShape(String),
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth(message.into())
    }

    pub fn request(message: impl Into<String>) -> Self {
        Error::Request(message.into())
    }

    pub fn response_shape(message: impl Into<String>) -> Self {
        Error::ResponseShape(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
