use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod app;
mod config;
mod handlers;
mod models;
mod services;
mod utils;

use config::AppConfig;
use models::AppState;
use services::keepalive_service;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let mut filter = EnvFilter::from_default_env();
    for directive in ["mockpay_receipt=debug", "tower_http=info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("🧾 Starting MockPay sample receipt service...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    if config.screenshot.api_keys.is_empty() {
        info!("Screenshot API keys not set - /api/receipt/screenshot will answer 502");
    } else {
        info!("Screenshot API configured with {} key(s)", config.screenshot.api_keys.len());
    }

    let keepalive = config.keepalive_url.clone();
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config);
    let router = app::create_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };

    info!("🚀 Receipt service listening on http://{}", addr);
    info!("🧪 Test endpoint: http://{}/api/test", addr);

    match keepalive {
        Some(url) => {
            info!("🌐 Keep-alive URL set - pinging {}/health", url);
            keepalive_service::spawn(url);
        }
        None => info!("Keep-alive disabled"),
    }

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
    }
}
