use blogapi::{app, state::AppState, users::services::ensure_first_superuser};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "blogapi=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    tracing::info!(
        project = %app_state.config.project_name,
        store = app_state.store.backend_name(),
        "starting"
    );

    ensure_first_superuser(app_state.store.as_ref(), &app_state.config).await?;

    app::serve(app::build_app(app_state)).await
}
