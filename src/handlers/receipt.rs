use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::{info, warn};

use super::receipt_image::image_url;
use super::ReceiptInput;
use crate::models::{AppState, Envelope, ReceiptHtmlData, ReceiptParams, ReceiptRecord};
use crate::services::render_service::ReceiptRenderer;
use crate::services::{html_service, receipt_service, screenshot_service};
use crate::utils::errors::ReceiptError;

pub(crate) fn build_record(
    state: &AppState,
    params: &ReceiptParams,
) -> Result<ReceiptRecord, ReceiptError> {
    receipt_service::build_record(
        params,
        state.config.recipient_account_display,
        &chrono::Local::now(),
    )
}

/// Rate-limited canvas render, off the async workers
pub(crate) async fn render_png(
    state: &AppState,
    record: ReceiptRecord,
) -> Result<Vec<u8>, ReceiptError> {
    state.render_limiter.acquire()?;

    let renderer = state.renderer;
    tokio::task::spawn_blocking(move || renderer.render_image(&record))
        .await
        .map_err(|e| ReceiptError::RenderFailure(format!("Render task failed: {}", e)))?
}

pub(crate) fn png_response(png: Vec<u8>, filename: &str) -> Response {
    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{}\"", filename))
        .unwrap_or_else(|_| {
            warn!("Unusable filename for Content-Disposition: {:?}", filename);
            HeaderValue::from_static("inline; filename=\"receipt.png\"")
        });

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        png,
    )
        .into_response()
}

/// JSON envelope with the receipt HTML for client-side capture.
/// The record is stored so the browser can attach its rendering later.
pub async fn receipt_json(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ReceiptInput(params): ReceiptInput,
) -> Result<Json<Envelope<ReceiptHtmlData>>, ReceiptError> {
    let record = build_record(&state, &params)?;
    let stored = state.store.insert(record.clone());
    let receipt_html = html_service::receipt_document(&record, Some(&stored.upload_token));
    let image_url = image_url(&state, &headers, &stored.filename)?;

    info!("Receipt data generated for transaction: {}", record.transaction_id);

    Ok(Json(Envelope::ok(
        "Receipt HTML generated. Use client-side rendering for image.",
        ReceiptHtmlData {
            receipt_id: record.transaction_id.clone(),
            upload_token: stored.upload_token,
            image_url,
            receipt_html,
            receipt_data: record,
            instructions: "Render receiptHtml in a browser; it posts the PNG back to /api/receipt-generated",
        },
    )))
}

pub async fn receipt_html(
    State(state): State<Arc<AppState>>,
    ReceiptInput(params): ReceiptInput,
) -> Result<Html<String>, ReceiptError> {
    let record = build_record(&state, &params)?;
    info!("Receipt HTML rendered for transaction: {}", record.transaction_id);
    Ok(Html(state.renderer.render_html(&record)))
}

pub async fn receipt_image(
    State(state): State<Arc<AppState>>,
    ReceiptInput(params): ReceiptInput,
) -> Result<Response, ReceiptError> {
    let record = build_record(&state, &params)?;
    let filename = format!("receipt_{}.png", record.transaction_id);

    let png = render_png(&state, record).await?;
    info!("Receipt image rendered: {} ({} bytes)", filename, png.len());

    Ok(png_response(png, &filename))
}

pub async fn receipt_screenshot(
    State(state): State<Arc<AppState>>,
    ReceiptInput(params): ReceiptInput,
) -> Result<Response, ReceiptError> {
    let record = build_record(&state, &params)?;
    let filename = format!("receipt_{}.png", record.transaction_id);

    // Captures count against the render limit too
    state.render_limiter.acquire()?;
    let png = screenshot_service::capture_receipt(&state.screenshot, &state.renderer, &record).await?;

    Ok(png_response(png, &filename))
}
