use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::model::{GenerationRequest, GenerationResponse};

pub type GenerationFuture<'a> = Pin<Box<dyn Future<Output = Result<GenerationResponse>> + Send + 'a>>;

/// Sends one generation request to a model and returns the first result.
///
/// Implemented by the REST and SDK-style invokers so callers can swap them.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{GenerationFuture, TextGenerator};
    use crate::error::Error;
    use crate::model::{GenerationRequest, GenerationResponse};

    #[derive(Debug)]
    enum StubOutcome {
        Ok(String),
        Err(String),
    }

    /// Records every request and answers with a canned outcome.
    #[derive(Debug)]
    pub(crate) struct StubGenerator {
        calls: Mutex<Vec<GenerationRequest>>,
        outcome: StubOutcome,
    }

    impl StubGenerator {
        pub(crate) fn ok(text: impl Into<String>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                outcome: StubOutcome::Ok(text.into()),
            }
        }

        pub(crate) fn err(message: impl Into<String>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                outcome: StubOutcome::Err(message.into()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<GenerationRequest> {
            self.calls.lock().expect("stub lock poisoned").clone()
        }
    }

    impl TextGenerator for StubGenerator {
        fn generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a> {
            self.calls
                .lock()
                .expect("stub lock poisoned")
                .push(request.clone());
            let result = match &self.outcome {
                StubOutcome::Ok(text) => Ok(GenerationResponse::text(text.clone())),
                StubOutcome::Err(message) => Err(Error::request(message.clone())),
            };
            Box::pin(async move { result })
        }
    }
}
