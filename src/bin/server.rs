//! Orchestrator HTTP server binary.
//!
//! Starts an axum HTTP server exposing agent registration and capability
//! invocation.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `BIND_HOST` — bind interface (default: 0.0.0.0)
//! - `ORCHESTRATOR_API_KEYS` — comma-separated pre-shared keys
//! - `FORWARD_TIMEOUT_MS` — agent call timeout (default: 10000)
//! - `DISPATCH_MODE` — `forward` (default) or `announce`
//! - `RUST_LOG` — Tracing filter (default: "info,agent_orchestrator=debug")
//!
//! # Usage
//!
//! ```bash
//! ORCHESTRATOR_API_KEYS=dev-key cargo run --bin server
//! ```

use agent_orchestrator::config::OrchestratorConfig;
use agent_orchestrator::server::{app_router, AppState};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agent_orchestrator=debug".into()),
        )
        .init();

    let config = OrchestratorConfig::from_env().context("Invalid configuration")?;

    if config.api_keys.is_empty() {
        tracing::error!(
            "No API keys configured (ORCHESTRATOR_API_KEYS); every gated request will fail with 500"
        );
    } else {
        tracing::info!(
            "Loaded {} API key(s): {}",
            config.api_keys.len(),
            config.api_keys.fingerprints().join(", ")
        );
    }

    let state = AppState::from_config(&config).context("Failed to build agent transport")?;
    let app = app_router(state);

    let bind_addr = config.bind_addr();
    tracing::info!("agent-orchestrator {} starting on {}", agent_orchestrator::VERSION, bind_addr);
    tracing::info!(
        "Dispatch mode: {}, forward timeout: {}ms",
        config.dispatch_mode,
        config.forward_timeout.as_millis()
    );
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health   — liveness probe");
    tracing::info!("  POST /register — agent registration");
    tracing::info!("  POST /message  — capability invocation");
    tracing::info!("  GET  /agents   — registration listing");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
