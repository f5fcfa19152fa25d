use tracing::debug;

use crate::auth;
use crate::error::Result;
use crate::generator::{GenerationFuture, TextGenerator};
use crate::model::{GenerationParameters, GenerationRequest, GenerationResponse};
use crate::providers::ServiceContext;
use crate::providers::rest::send_generation;

/// Model handle bound to one model id, one parameter set and the project's
/// credentials. Callers only supply the prompt.
#[derive(Debug, Clone)]
pub struct FoundationModel {
    model_id: String,
    params: GenerationParameters,
    ctx: ServiceContext,
}

impl FoundationModel {
    pub fn new(model_id: impl Into<String>, params: GenerationParameters, ctx: ServiceContext) -> Self {
        Self {
            model_id: model_id.into(),
            params,
            ctx,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub async fn generate(&self, prompt: &str) -> Result<GenerationResponse> {
        let token = auth::fetch_token(
            self.ctx.client(),
            self.ctx.iam_token_url(),
            &self.ctx.credentials().api_key,
        )
        .await?;
        let request = GenerationRequest::new(self.model_id.clone(), prompt, self.params.clone());
        send_generation(&self.ctx, &token, &request).await
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        Ok(self.generate(prompt).await?.generated_text)
    }
}

/// SDK-style variant: builds a [`FoundationModel`] for every request.
#[derive(Debug, Clone)]
pub struct SdkGenerator {
    ctx: ServiceContext,
}

impl SdkGenerator {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }
}

impl TextGenerator for SdkGenerator {
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerationFuture<'a> {
        Box::pin(async move {
            let model = FoundationModel::new(
                request.model_id.clone(),
                request.parameters.clone(),
                self.ctx.clone(),
            );
            debug!(model = %model.model_id(), "constructed foundation model handle");
            model.generate(&request.prompt).await
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{FoundationModel, SdkGenerator};
    use crate::generator::TextGenerator;
    use crate::model::{GenerationParameters, GenerationRequest, ModelType};
    use crate::prompt::build_prompt;
    use crate::providers::ServiceContext;
    use crate::providers::test_support::test_config;

    fn context_for(server: &MockServer) -> ServiceContext {
        ServiceContext::from_config(&test_config(&server.uri())).expect("context should build")
    }

    #[tokio::test]
    async fn model_handle_applies_bound_parameters_to_each_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok-sdk" })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ml/v1-beta/generation/text"))
            .and(header("authorization", "Bearer tok-sdk"))
            .and(body_partial_json(json!({
                "model_id": "meta-llama/llama-2-13b-chat",
                "parameters": {
                    "decoding_method": "greedy",
                    "max_new_tokens": 100,
                    "min_new_tokens": 50,
                    "temperature": 0.7
                },
                "project_id": "project-123"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "generated_text": "1. Slow website" }]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let model = FoundationModel::new(
            ModelType::Llama2Chat13b.as_str(),
            GenerationParameters::greedy(100, 50).with_temperature(0.7),
            context_for(&server),
        );

        let first = model.generate_text("first prompt").await.expect("first call");
        let second = model.generate_text("second prompt").await.expect("second call");
        assert_eq!(first, "1. Slow website");
        assert_eq!(second, "1. Slow website");
    }

    #[tokio::test]
    async fn sdk_generator_forwards_request_prompt_and_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok123" })))
            .expect(1)
            .mount(&server)
            .await;
        let prompt = build_prompt("What is IBM?");
        Mock::given(method("POST"))
            .and(path("/ml/v1-beta/generation/text"))
            .and(body_partial_json(json!({
                "model_id": "google/flan-ul2",
                "input": &prompt,
                "parameters": { "stop_sequences": ["."] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "generated_text": "International Business Machines" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = GenerationRequest::for_model(
            ModelType::FlanUl2,
            prompt.clone(),
            GenerationParameters::greedy(100, 20).with_stop_sequences(["."]),
        );
        let response = SdkGenerator::new(context_for(&server))
            .generate(&request)
            .await
            .expect("generation should succeed");

        assert_eq!(response.generated_text, "International Business Machines");
    }
}
