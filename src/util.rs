use tracing_subscriber::{fmt, EnvFilter};

/// Initialize dotenv and structured tracing.
///
/// `RUST_LOG` takes precedence; `LOG_LEVEL` is honored for parity with the
/// rest of the service's environment surface.
pub fn init_tracing() {
    let _ = dotenvy::dotenv();

    let filter = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| "info,tower_http=info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Get the bind address for the HTTP server from env or default to 0.0.0.0:8000.
pub fn env_bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into())
}
