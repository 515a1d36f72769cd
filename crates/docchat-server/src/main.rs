mod configuration;
mod error;
mod routes;
mod state;
mod store;

use docchat::agent::Agent;
use docchat::providers::factory;
use docchat::tool::ChatbotDeps;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::configuration::Settings;
use crate::state::AppState;
use crate::store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Some(path) = configuration::load_env_file(None) {
        info!("loaded environment from {}", path.display());
    }
    let settings = Settings::new()?;
    let addr = settings.server.socket_addr()?;

    let store = SqliteStore::connect(&settings.database.url, settings.database.max_connections)
        .await?;
    let provider = factory::get_provider(settings.provider.into_config())?;
    let agent = Agent::new(provider).with_max_tool_rounds(settings.agent.max_tool_rounds);
    let deps = ChatbotDeps {
        secret_number: settings.agent.secret_number,
    };
    let state = AppState::new(store, agent, deps);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
