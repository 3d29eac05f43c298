use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use axum::Json;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Url;
use tracing::info;

use super::receipt::{build_record, png_response, render_png};
use super::{JsonBody, ReceiptInput};
use crate::models::{
    AppState, Envelope, GeneratedImageAck, GeneratedImageUpload, ReceiptImageData,
};
use crate::utils::errors::ReceiptError;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

fn public_base(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.public_base_url {
        return base.clone();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("localhost:{}", state.config.port));
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");

    format!("{}://{}", proto, host)
}

/// Absolute URL for a stored receipt image; the filename is percent-encoded
/// as a single path segment
pub(crate) fn image_url(
    state: &AppState,
    headers: &HeaderMap,
    filename: &str,
) -> Result<String, ReceiptError> {
    let base = public_base(state, headers);
    let mut url = Url::parse(&base)
        .map_err(|e| ReceiptError::InvalidRequest(format!("Unusable host '{}': {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ReceiptError::InvalidRequest(format!("Unusable host '{}'", base)))?
        .pop_if_empty()
        .extend(["api", "receipt-image", filename]);

    Ok(url.into())
}

/// Decode a `data:image/png;base64,...` URL (or bare base64) into PNG bytes
pub fn decode_image_data(image_data: &str) -> Result<Vec<u8>, ReceiptError> {
    let encoded = match image_data.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => {
            if !prefix.ends_with(";base64") {
                return Err(ReceiptError::InvalidImageData(
                    "data URL is not base64 encoded".to_string(),
                ));
            }
            rest
        }
        _ => image_data,
    };

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| ReceiptError::InvalidImageData(e.to_string()))?;

    if !bytes.starts_with(PNG_SIGNATURE) {
        return Err(ReceiptError::InvalidImageData("not a PNG image".to_string()));
    }
    Ok(bytes)
}

/// Store the receipt and hand back a URL the image can be fetched from
pub async fn receipt_image_url(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ReceiptInput(params): ReceiptInput,
) -> Result<Json<Envelope<ReceiptImageData>>, ReceiptError> {
    let record = build_record(&state, &params)?;
    let filename = state.store.insert(record.clone()).filename;
    let image_url = image_url(&state, &headers, &filename)?;

    info!("Image URL generated: {} ({} receipts stored)", image_url, state.store.len());

    Ok(Json(Envelope::ok(
        "Receipt image URL generated",
        ReceiptImageData {
            image_url,
            receipt_data: record,
        },
    )))
}

pub async fn get_receipt_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ReceiptError> {
    let stored = state
        .store
        .get(&filename)
        .ok_or_else(|| ReceiptError::NotFound("Receipt not found or expired".to_string()))?;

    let png = match stored.image {
        Some(png) => png,
        None => render_png(&state, stored.record).await?,
    };

    Ok(png_response(png, &filename))
}

/// Accept an image rendered in the browser from the HTML envelope
pub async fn receipt_generated(
    State(state): State<Arc<AppState>>,
    JsonBody(upload): JsonBody<GeneratedImageUpload>,
) -> Result<Json<Envelope<GeneratedImageAck>>, ReceiptError> {
    let png = decode_image_data(&upload.image_data)?;
    let bytes = png.len();

    let filename = state
        .store
        .attach_image(&upload.receipt_id, &upload.upload_token, png)?;

    info!("Client image attached to {} ({} bytes)", filename, bytes);

    Ok(Json(Envelope::ok(
        "Receipt image stored",
        GeneratedImageAck {
            receipt_id: upload.receipt_id,
            filename,
            bytes,
        },
    )))
}
