use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bandstand::{config::Config, controllers, database::Database, views::View, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bandstand");

    // Connect to the database
    let db = Database::new(&config.database.url, config.database.pool_size).await?;
    info!("Database connected");

    // Run migrations
    db.run_migrations().await?;

    // Create the shared application state
    let app_state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    // Create the main router
    let app = controllers::routes()
        .route("/health", get(|| async { "OK" }))
        .fallback(controllers::not_found)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// A panicking handler still answers with the 500 page.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("request handler panicked: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        View::new("errors/500", json!({})),
    )
        .into_response()
}
