#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = watsonx_demo::logging::init();
    watsonx_demo::run_form().await
}
