use career_architect::{
    agent::OrchestratorConfig,
    api::{start_server, ApiState},
    config::Settings,
    state::SqliteProfileStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    let settings = Settings::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    if settings.huggingface.api_key.is_none() {
        eprintln!("⚠️  HUGGINGFACE_API_KEY not set, content will come from templates");
    }

    info!("🚀 Career Architect - API Server");
    info!("📍 Port: {}", settings.port);
    info!("🌱 Environment: {}", settings.env);

    // Create components
    let store = Arc::new(SqliteProfileStore::connect_lazy(&settings.database_url)?);
    let generator = settings.text_generator()?;

    info!("✅ Agents initialized");
    info!("📡 Starting API server...");

    // Start API server
    start_server(
        ApiState::new(generator, OrchestratorConfig::default(), store),
        settings.port,
    ).await?;

    Ok(())
}
