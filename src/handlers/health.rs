use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::models::{AppState, HealthStatus};

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

/// Lists the receipt endpoints with a ready-to-use example
pub async fn api_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    let base = state
        .config
        .public_base_url
        .clone()
        .unwrap_or_else(|| format!("http://localhost:{}", state.config.port));
    let query = "senderName=John+Doe&senderAccountNumber=9123456789&recipientName=Jane+Smith\
                 &recipientBank=Access+Bank&recipientAccountNumber=9876543210&amount=5000";

    Json(json!({
        "success": true,
        "message": "Sample receipt API is working",
        "endpoints": {
            "json": "/api/receipt",
            "html": "/api/receipt/html",
            "image": "/api/receipt/image",
            "screenshot": "/api/receipt/screenshot",
            "imageUrl": "/api/receipt-image",
            "generated": "/api/receipt-generated",
        },
        "example": format!("{}/api/receipt/image?{}", base, query),
        "required": [
            "senderName", "senderAccountNumber", "recipientName",
            "recipientBank", "recipientAccountNumber", "amount",
        ],
        "optional": ["transactionId", "status"],
    }))
}
