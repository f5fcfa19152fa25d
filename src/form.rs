use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Error;
use crate::generator::TextGenerator;
use crate::model::{GenerationParameters, GenerationRequest, ModelType};
use crate::prompt::{FALLBACK_QUESTION, build_prompt, question_or_fallback};

const PAGE_TITLE: &str = "Test watsonx.ai LLM";

#[derive(Clone)]
struct FormState {
    generator: Arc<dyn TextGenerator>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    #[serde(default)]
    pub question: Option<String>,
}

pub fn question_request(prompt: String) -> GenerationRequest {
    GenerationRequest::for_model(
        ModelType::FlanUl2,
        prompt,
        GenerationParameters::greedy(100, 20).with_stop_sequences(["."]),
    )
}

pub fn router(generator: Arc<dyn TextGenerator>) -> Router {
    Router::new()
        .route("/", get(form_handler))
        .with_state(FormState { generator })
}

pub async fn serve(addr: &str, generator: Arc<dyn TextGenerator>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind web form to '{addr}'"))?;
    info!(addr = %addr, "web form listening");

    axum::serve(listener, router(generator))
        .await
        .context("Web form server stopped unexpectedly")
}

async fn form_handler(
    State(state): State<FormState>,
    Query(query): Query<FormQuery>,
) -> Result<Html<String>, FormError> {
    let raw = query.question.unwrap_or_default();
    let question = question_or_fallback(&raw).to_string();
    let prompt = build_prompt(&question);

    let response = state
        .generator
        .generate(&question_request(prompt.clone()))
        .await
        .map_err(|err| FormError {
            input: raw.clone(),
            prompt: prompt.clone(),
            source: err,
        })?;

    Ok(Html(render_page(
        &raw,
        Some(&prompt),
        Some(Answer {
            question: &question,
            output: &response.generated_text,
        }),
        None,
    )))
}

struct FormError {
    input: String,
    prompt: String,
    source: Error,
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        warn!(error = %self.source, "web form generation failed");
        let page = render_page(
            &self.input,
            Some(&self.prompt),
            None,
            Some(&self.source.to_string()),
        );
        (StatusCode::BAD_GATEWAY, Html(page)).into_response()
    }
}

struct Answer<'a> {
    question: &'a str,
    output: &'a str,
}

fn render_page(
    input: &str,
    prompt: Option<&str>,
    answer: Option<Answer<'_>>,
    error: Option<&str>,
) -> String {
    let mut body = format!(
        "<h1>{title}</h1>\n\
         <form method=\"get\" action=\"/\">\n\
         <label for=\"question\">Ask a question, for example: {fallback}</label>\n\
         <input type=\"text\" id=\"question\" name=\"question\" value=\"{input}\" autofocus>\n\
         </form>\n",
        title = PAGE_TITLE,
        fallback = FALLBACK_QUESTION,
        input = escape_html(input),
    );

    if let Some(prompt) = prompt {
        body.push_str(&format!(
            "<label for=\"prompt\">Generated Prompt</label>\n\
             <textarea id=\"prompt\" readonly rows=\"14\" cols=\"80\">{}</textarea>\n",
            escape_html(prompt)
        ));
    }

    if let Some(answer) = answer {
        body.push_str(&format!(
            "<p><strong>Answer to your question:</strong> {question}</p>\n\
             <p id=\"answer\"><em>{output}</em></p>\n",
            question = escape_html(answer.question),
            output = escape_html(answer.output),
        ));
    }

    if let Some(error) = error {
        body.push_str(&format!(
            "<p id=\"error\" role=\"alert\">{}</p>\n",
            escape_html(error)
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{PAGE_TITLE}</title></head>\n\
         <body>\n{body}</body>\n</html>\n"
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    use super::{escape_html, router};
    use crate::generator::testing::StubGenerator;
    use crate::model::{DecodingMethod, ModelType};
    use crate::prompt::build_prompt;

    async fn get_page(generator: Arc<StubGenerator>, uri: &str) -> (StatusCode, String) {
        let app = router(generator);
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn blank_question_uses_fallback_before_building_prompt() {
        let generator = Arc::new(StubGenerator::ok("A technology company"));

        let (status, page) = get_page(generator.clone(), "/?question=++").await;

        assert_eq!(status, StatusCode::OK);
        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, build_prompt("What is IBM?"));
        assert!(page.contains("Answer to your question:</strong> What is IBM?"));
        assert!(page.contains("<em>A technology company</em>"));
    }

    #[tokio::test]
    async fn first_visit_without_query_answers_fallback_question() {
        let generator = Arc::new(StubGenerator::ok("IBM"));

        let (status, _page) = get_page(generator.clone(), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(generator.calls()[0].prompt, build_prompt("What is IBM?"));
    }

    #[tokio::test]
    async fn submitted_question_is_spliced_into_prompt_and_rendered() {
        let generator = Arc::new(StubGenerator::ok("Portuguese"));

        let (_, page) = get_page(
            generator.clone(),
            "/?question=What%20language%20is%20spoken%20in%20Portugal%3F",
        )
        .await;

        let calls = generator.calls();
        let request = &calls[0];
        assert_eq!(request.model_id, ModelType::FlanUl2.as_str());
        assert_eq!(request.parameters.decoding_method, DecodingMethod::Greedy);
        assert_eq!(request.parameters.max_new_tokens, 100);
        assert_eq!(request.parameters.min_new_tokens, 20);
        assert!(
            request
                .prompt
                .ends_with("Question: What language is spoken in Portugal?Answer:")
        );
        assert!(page.contains("Generated Prompt"));
        assert!(page.contains("readonly"));
        assert!(page.contains("value=\"What language is spoken in Portugal?\""));
    }

    #[tokio::test]
    async fn markup_in_question_is_escaped_on_the_page_only() {
        let generator = Arc::new(StubGenerator::ok("<script>x</script>"));

        let (_, page) = get_page(generator.clone(), "/?question=%3Cb%3Ehi%3C%2Fb%3E").await;

        assert!(generator.calls()[0].prompt.contains("<b>hi</b>"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(page.contains("&lt;b&gt;hi&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn generation_failure_renders_bad_gateway() {
        let generator = Arc::new(StubGenerator::err("Generation request failed with status 500"));

        let (status, page) = get_page(generator, "/?question=hello").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(page.contains("status 500"));
        assert!(page.contains("value=\"hello\""));
    }

    #[tokio::test]
    async fn generation_failure_still_shows_generated_prompt() {
        let generator = Arc::new(StubGenerator::err("Generation request failed with status 500"));

        let (status, page) = get_page(generator, "/?question=hello").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(page.contains("Generated Prompt"));
        assert!(page.contains("<textarea id=\"prompt\" readonly"));
        assert!(page.contains("Question: helloAnswer:</textarea>"));
        assert!(!page.contains("id=\"answer\""));
        let prompt_at = page.find("Generated Prompt").expect("prompt panel");
        let error_at = page.find("id=\"error\"").expect("error paragraph");
        assert!(prompt_at < error_at);
    }

    #[test]
    fn escape_html_replaces_reserved_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }
}
