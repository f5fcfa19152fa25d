use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{self, AuthToken};
use crate::error::{Error, Result};
use crate::generator::{GenerationFuture, TextGenerator};
use crate::model::{GenerationParameters, GenerationRequest, GenerationResponse};
use crate::providers::ServiceContext;
use crate::providers::http_errors::generation_request_error;

#[derive(Debug, Serialize)]
struct TextGenerationPayload<'a> {
    model_id: &'a str,
    input: &'a str,
    parameters: &'a GenerationParameters,
    project_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TextGenerationResults {
    results: Vec<GenerationResponse>,
}

/// Posts one text-generation request with an already acquired token.
pub(crate) async fn send_generation(
    ctx: &ServiceContext,
    token: &AuthToken,
    request: &GenerationRequest,
) -> Result<GenerationResponse> {
    let api_url = ctx.generation_url();
    let body = TextGenerationPayload {
        model_id: &request.model_id,
        input: &request.prompt,
        parameters: &request.parameters,
        project_id: &ctx.credentials().project_id,
    };
    debug!(
        api_url = %api_url,
        model = %request.model_id,
        decoding_method = request.parameters.decoding_method.as_str(),
        prompt_len = request.prompt.len(),
        "sending text generation request"
    );

    let response = ctx
        .client()
        .post(&api_url)
        .header(ACCEPT, "application/json")
        .header(AUTHORIZATION, token.authorization_header())
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %request.model_id,
                error = %err,
                "text generation request failed"
            );
            generation_request_error(err, &api_url, ctx.timeout_secs())
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %request.model_id,
            status = %status,
            response_body_len = response_body.len(),
            "inference service returned non-success status"
        );
        return Err(Error::request(format!(
            "Generation request failed with status {status}: {response_body}"
        )));
    }

    let raw = response
        .text()
        .await
        .map_err(|err| generation_request_error(err, &api_url, ctx.timeout_secs()))?;
    let first = first_result(&raw)?;
    debug!(
        model = %request.model_id,
        generated_token_count = ?first.generated_token_count,
        input_token_count = ?first.input_token_count,
        stop_reason = ?first.stop_reason,
        "received text generation response"
    );
    Ok(first)
}

fn first_result(raw: &str) -> Result<GenerationResponse> {
    let parsed: TextGenerationResults = serde_json::from_str(raw)
        .map_err(|err| Error::response_shape(format!("expected results[].generated_text: {err}")))?;
    parsed
        .results
        .into_iter()
        .next()
        .ok_or_else(|| Error::response_shape("results array is empty"))
}

/// Raw REST variant: a fresh IAM token, then one POST to the generation endpoint.
#[derive(Debug, Clone)]
pub struct RestGenerator {
    ctx: ServiceContext,
}

impl RestGenerator {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }
}

impl TextGenerator for RestGenerator {
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a> {
        Box::pin(async move {
            let token = auth::fetch_token(
                self.ctx.client(),
                self.ctx.iam_token_url(),
                &self.ctx.credentials().api_key,
            )
            .await?;
            send_generation(&self.ctx, &token, request).await
        })
    }
}
