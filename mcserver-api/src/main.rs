use anyhow::Context;
use tracing_subscriber::EnvFilter;

use mcserver_api::{build_app, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(
        "mcserver-api {} managing {}/{}/{} via '{}'",
        mcserver_api::version::get_backend_version(),
        settings.project_id,
        settings.zone,
        settings.instance_name,
        settings.provider
    );

    let addr = settings.bind_addr;
    let state = AppState::new(settings)?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
