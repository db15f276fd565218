//! Blog-writing agent binary.
//!
//! Serves `POST /callback` and, when an orchestrator is configured, registers
//! the `blog-writing` capability with it on startup.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 5000)
//! - `ORCHESTRATOR_URL` — orchestrator base URL; registration is skipped if unset
//! - `ORCHESTRATOR_API_KEY` — key sent as `x-api-key`
//! - `AGENT_ID` — registry id (default: "blog-agent")
//! - `AGENT_PUBLIC_URL` — base URL the orchestrator reaches this agent at
//!   (default: `http://localhost:<PORT>`)

use agent_orchestrator::blog::agent::{callback_router, registration_request};
use agent_orchestrator::client::OrchestratorClient;
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agent_orchestrator=debug".into()),
        )
        .init();

    let port: u16 = match std::env::var("PORT") {
        Ok(raw) => raw.parse().with_context(|| format!("Invalid PORT '{}'", raw))?,
        Err(_) => 5000,
    };
    let bind_addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("blog agent listening on {}", bind_addr);

    match std::env::var("ORCHESTRATOR_URL") {
        Ok(orchestrator_url) => {
            let agent_id = std::env::var("AGENT_ID").unwrap_or_else(|_| "blog-agent".into());
            let public_url = std::env::var("AGENT_PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port));
            let api_key = std::env::var("ORCHESTRATOR_API_KEY").ok();

            let client = OrchestratorClient::new(orchestrator_url, api_key)?;
            let request = registration_request(&agent_id, &public_url);
            // The listener is already bound, so forwarded calls can arrive
            // as soon as the orchestrator accepts the registration.
            tokio::spawn(async move {
                match client.register(&request).await {
                    Ok(ack) => tracing::info!("{} ({})", ack.message, ack.agent_id),
                    Err(e) => tracing::error!("Registration with orchestrator failed: {}", e),
                }
            });
        }
        Err(_) => {
            tracing::warn!("ORCHESTRATOR_URL not set; serving without registering");
        }
    }

    axum::serve(listener, callback_router())
        .await
        .context("Server failed")?;
    Ok(())
}
