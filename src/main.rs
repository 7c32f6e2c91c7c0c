use std::sync::Arc;

use grievance_assist::channels::CliChannel;
use grievance_assist::config::AppConfig;
use grievance_assist::intake::{ChatRouteState, DialogueController, chat_routes};
use grievance_assist::llm::create_provider;
use grievance_assist::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let _log_guard = logging::init(config.log_dir.as_deref());

    eprintln!("🏛  Municipal Grievance Assistant v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {} ({:?})", config.llm.model, config.llm.backend);
    eprintln!("   Keyword gate: {:?}", config.assistant.gate);

    let llm = create_provider(&config.llm)?;
    let controller = Arc::new(DialogueController::new(llm, config.assistant.clone()));

    // ── Web chat ─────────────────────────────────────────────────────────
    if let Some(port) = config.http_port {
        let app = chat_routes(ChatRouteState::new(Arc::clone(&controller)));
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        eprintln!("   Chat WS: ws://0.0.0.0:{}/ws/chat", port);
        eprintln!("   Session API: http://0.0.0.0:{}/api/session", port);
        tokio::spawn(async move {
            tracing::info!(port, "Web chat server started");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Web chat server stopped");
            }
        });
    }

    // ── Terminal ─────────────────────────────────────────────────────────
    eprintln!("   Type a message and press Enter. /reset to start over, /quit to exit.\n");
    let mut cli = CliChannel::new();
    controller.run(&mut cli).await?;

    Ok(())
}
