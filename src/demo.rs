use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

use crate::generator::TextGenerator;
use crate::model::{GenerationParameters, GenerationRequest, ModelType};
use crate::prompt::{
    CAPITAL_OF_FRANCE_REQUEST, FALLBACK_QUESTION, SAMPLE_COMPLAINT, build_prompt, complaint_prompt,
};

const RULE: &str = "---------------------------------------------------------------------------";
const REST_BANNER: &str =
    "--------------------------Invocation with REST-------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invoker {
    Sdk,
    Rest,
}

/// One labeled prompt/response pair of the console demo.
#[derive(Debug, Clone)]
pub struct DemoStep {
    pub name: &'static str,
    pub invoker: Invoker,
    pub request_label: &'static str,
    pub response_label: &'static str,
    pub request: GenerationRequest,
}

pub fn demo_steps() -> Vec<DemoStep> {
    vec![
        DemoStep {
            name: "answer_questions",
            invoker: Invoker::Sdk,
            request_label: "Question/request",
            response_label: "Answer",
            request: GenerationRequest::for_model(
                ModelType::FlanUl2,
                CAPITAL_OF_FRANCE_REQUEST,
                GenerationParameters::sample(300, 50).with_temperature(0.7),
            ),
        },
        DemoStep {
            name: "list_of_complaints",
            invoker: Invoker::Sdk,
            request_label: "Prompt",
            response_label: "List of complaints",
            request: GenerationRequest::for_model(
                ModelType::Llama2Chat13b,
                complaint_prompt(SAMPLE_COMPLAINT),
                GenerationParameters::greedy(100, 50).with_temperature(0.7),
            ),
        },
        DemoStep {
            name: "few_shot_question",
            invoker: Invoker::Sdk,
            request_label: "Prompt",
            response_label: "Answer",
            request: GenerationRequest::for_model(
                ModelType::FlanUl2,
                build_prompt(FALLBACK_QUESTION),
                GenerationParameters::greedy(100, 20).with_stop_sequences(["."]),
            ),
        },
        DemoStep {
            name: "invoke_with_rest",
            invoker: Invoker::Rest,
            request_label: "Question/request",
            response_label: "Answer",
            request: GenerationRequest::for_model(
                ModelType::FlanUl2,
                CAPITAL_OF_FRANCE_REQUEST,
                GenerationParameters::sample(300, 50)
                    .with_temperature(0.7)
                    .with_stop_sequences(["."]),
            ),
        },
    ]
}

/// Runs every demo step in order and prints its prompt/response pair to `out`.
/// The first failure aborts the run.
pub async fn run_demo(
    sdk: &dyn TextGenerator,
    rest: &dyn TextGenerator,
    out: &mut impl Write,
) -> Result<()> {
    for step in demo_steps() {
        let generator = match step.invoker {
            Invoker::Sdk => sdk,
            Invoker::Rest => rest,
        };
        info!(step = step.name, model = %step.request.model_id, "running demo step");

        let response = generator
            .generate(&step.request)
            .await
            .with_context(|| format!("demo step '{}' failed", step.name))?;

        print_pair(&mut *out, &step, &response.generated_text)
            .context("Failed to write demo output")?;
    }

    Ok(())
}

fn print_pair(out: &mut impl Write, step: &DemoStep, answer: &str) -> std::io::Result<()> {
    let banner = match step.invoker {
        Invoker::Sdk => RULE,
        Invoker::Rest => REST_BANNER,
    };
    writeln!(out, "{banner}")?;
    writeln!(out, "{}: {}", step.request_label, step.request.prompt)?;
    writeln!(out, "{}: {}", step.response_label, answer)?;
    writeln!(out, "{RULE}")?;
    out.flush()
}
