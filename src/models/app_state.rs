use std::sync::Arc;
use std::time::Instant;

use crate::api::screenshot::ScreenshotClient;
use crate::config::AppConfig;
use crate::services::render_service::CanvasRenderer;
use crate::services::store_service::ReceiptStore;
use crate::utils::ratelimit::RenderRateLimiter;

/// Shared per-process state handed to every handler
pub struct AppState {
    pub config: AppConfig,
    pub started_at: Instant,
    pub renderer: CanvasRenderer,
    pub store: ReceiptStore,
    pub render_limiter: RenderRateLimiter,
    pub screenshot: ScreenshotClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            started_at: Instant::now(),
            renderer: CanvasRenderer::default(),
            store: ReceiptStore::new(config.receipt_ttl, config.receipt_store_capacity),
            render_limiter: RenderRateLimiter::new(config.render_rate_limit),
            screenshot: ScreenshotClient::new(&config.screenshot),
            config,
        })
    }
}
