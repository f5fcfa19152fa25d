use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodingMethod {
    Greedy,
    Sample,
}

impl DecodingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Sample => "sample",
        }
    }
}

/// Foundation models used by the demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    FlanUl2,
    Llama2Chat13b,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlanUl2 => "google/flan-ul2",
            Self::Llama2Chat13b => "meta-llama/llama-2-13b-chat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub decoding_method: DecodingMethod,
    pub max_new_tokens: u32,
    pub min_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl GenerationParameters {
    pub fn new(decoding_method: DecodingMethod, max_new_tokens: u32, min_new_tokens: u32) -> Self {
        Self {
            decoding_method,
            max_new_tokens,
            min_new_tokens,
            temperature: None,
            stop_sequences: None,
        }
    }

    pub fn greedy(max_new_tokens: u32, min_new_tokens: u32) -> Self {
        Self::new(DecodingMethod::Greedy, max_new_tokens, min_new_tokens)
    }

    pub fn sample(max_new_tokens: u32, min_new_tokens: u32) -> Self {
        Self::new(DecodingMethod::Sample, max_new_tokens, min_new_tokens)
    }

    // Forwarded as-is for either decoding method; the service decides what to do with it.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_stop_sequences<I, S>(mut self, stop_sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_sequences = Some(stop_sequences.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model_id: String,
    pub prompt: String,
    pub parameters: GenerationParameters,
}

impl GenerationRequest {
    pub fn new(
        model_id: impl Into<String>,
        prompt: impl Into<String>,
        parameters: GenerationParameters,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            parameters,
        }
    }

    pub fn for_model(model: ModelType, prompt: impl Into<String>, parameters: GenerationParameters) -> Self {
        Self::new(model.as_str(), prompt, parameters)
    }
}

/// First result of a generation call. Only `generated_text` is consumed; the
/// rest is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationResponse {
    pub generated_text: String,
    #[serde(default)]
    pub generated_token_count: Option<u32>,
    #[serde(default)]
    pub input_token_count: Option<u32>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl GenerationResponse {
    pub fn text(generated_text: impl Into<String>) -> Self {
        Self {
            generated_text: generated_text.into(),
            generated_token_count: None,
            input_token_count: None,
            stop_reason: None,
        }
    }
}
