//! JSON envelopes returned by the API

use serde::{Deserialize, Serialize};

use super::receipt::ReceiptRecord;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the process started
    pub uptime: f64,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptHtmlData {
    pub receipt_id: String,
    /// Required by `/api/receipt-generated` to attach a client-rendered image
    pub upload_token: String,
    /// Serves the client-rendered image once posted, the canvas render until then
    pub image_url: String,
    pub receipt_html: String,
    pub receipt_data: ReceiptRecord,
    pub instructions: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptImageData {
    pub image_url: String,
    pub receipt_data: ReceiptRecord,
}

/// Client-rendered receipt image posted back after html-to-canvas conversion
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImageUpload {
    pub receipt_id: String,
    pub upload_token: String,
    /// `data:image/png;base64,...` URL or bare base64
    pub image_data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImageAck {
    pub receipt_id: String,
    pub filename: String,
    pub bytes: usize,
}
