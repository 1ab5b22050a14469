use std::sync::Arc;

use md2docx::config::Config;
use md2docx::convert::pandoc_version;
use md2docx::server::build_router;
use md2docx::util::{env_bind_addr, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env();

    match pandoc_version(&config).await {
        Ok(version) => tracing::info!(
            pandoc_version = %version,
            max_content_size_bytes = config.max_content_size_bytes,
            allowed_origins = ?config.allowed_origins,
            conversion_timeout_secs = config.conversion_timeout.as_secs(),
            "document export service started"
        ),
        Err(err) => tracing::warn!(
            error = %err,
            "converter probe failed at startup; /health will report unhealthy"
        ),
    }

    let addr = env_bind_addr();
    let router = build_router(Arc::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("md2docx listening on http://{addr}");
    axum::serve(listener, router).await?;

    Ok(())
}
