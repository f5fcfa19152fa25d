pub mod auth;
pub mod config;
pub mod demo;
pub mod error;
pub mod form;
pub mod generator;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod providers;

use anyhow::{Context, Result};
use std::io;
use std::sync::Arc;
use tracing::info;

use config::Config;
use providers::{RestGenerator, SdkGenerator, ServiceContext};

pub use error::Error;
pub use generator::TextGenerator;
pub use model::{DecodingMethod, GenerationParameters, GenerationRequest, GenerationResponse};

fn load_config() -> Result<Config> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env().context("Failed to load configuration")?;
    info!(
        service_url = %cfg.credentials.service_url,
        project_id = %cfg.credentials.project_id,
        iam_token_url = %cfg.iam_token_url,
        api_version = %cfg.api_version,
        model_timeout_secs = cfg.model_timeout_secs,
        "loaded runtime configuration"
    );
    Ok(cfg)
}

/// Console demo: runs the fixed generation sequence and prints each pair to stdout.
pub async fn run() -> Result<()> {
    let cfg = load_config()?;
    let ctx = ServiceContext::from_config(&cfg)?;
    let sdk = SdkGenerator::new(ctx.clone());
    let rest = RestGenerator::new(ctx);

    let mut stdout = io::stdout();
    demo::run_demo(&sdk, &rest, &mut stdout).await
}

/// Web form: serves the question page until the process is stopped.
pub async fn run_form() -> Result<()> {
    let cfg = load_config()?;
    let ctx = ServiceContext::from_config(&cfg)?;
    let generator: Arc<dyn TextGenerator> = Arc::new(SdkGenerator::new(ctx));

    form::serve(&cfg.form_bind_addr, generator).await
}
