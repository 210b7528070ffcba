use anyhow::Context;

use garage_api::{config, db, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "garage_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("starting garage-api in {:?} mode", config.environment);

    let pool = db::connect(&config.database.url)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;
    db::init_schema(&pool).await.context("schema init")?;

    let app = handlers::router(db::AppState { pool });

    // Allow deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("garage-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")
}
