use domain::gateway::ai::{AiGateway, HttpAiGateway};
use domain::gateway::knowledge_bank::KnowledgeBankClient;
use domain::{InMemoryKnowledgeBank, PipelineContext};
use log::{error, info};
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting CallBank v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "AI gateway at [{}], knowledge bank at [{}]",
        config.ai_gateway_base_url(),
        config.knowledge_bank_base_url()
    );

    let outbound_timeout = Duration::from_secs(config.outbound_timeout_secs);

    let ai: Arc<dyn AiGateway> =
        match HttpAiGateway::new(config.ai_gateway_base_url(), outbound_timeout) {
            Ok(gateway) => Arc::new(gateway),
            Err(e) => {
                error!("Failed to build AI gateway client: {e}");
                std::process::exit(1);
            }
        };

    let remote = match KnowledgeBankClient::new(config.knowledge_bank_base_url(), outbound_timeout)
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build knowledge bank client: {e}");
            std::process::exit(1);
        }
    };

    let pipeline = PipelineContext::new(Arc::new(InMemoryKnowledgeBank::new()), ai, remote);
    let app_state = web::AppState::new(config.clone(), pipeline);

    let router = web::router::define_routes(app_state);

    let interface = config.interface.as_deref().unwrap_or("127.0.0.1");
    let listen_addr = format!("{}:{}", interface, config.port);
    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {listen_addr}: {e}");
            std::process::exit(1);
        }
    };

    info!("Server starting... listening for requests on {listen_addr}");

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server stopped gracefully");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    info!("Shutdown signal received, draining in-flight requests");
}
