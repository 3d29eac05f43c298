use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Everything that can go wrong while turning a request into a receipt
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameter(Vec<&'static str>),
    #[error("Invalid amount: '{0}' is not a number")]
    InvalidAmount(String),
    #[error("Invalid {field}: must be exactly 10 digits")]
    InvalidAccountFormat { field: &'static str },
    #[error("Invalid status: '{0}'. Supported: Successful, Pending, Failed")]
    InvalidStatus(String),
    #[error("Invalid transactionId: use 1-{max} letters, digits, '-' or '_'")]
    InvalidTransactionId { max: usize },
    #[error("{field} is too long: at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("Malformed request: {0}")]
    InvalidRequest(String),
    #[error("Invalid image data: {0}")]
    InvalidImageData(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Upload token does not match receipt {0}")]
    UploadRejected(String),
    #[error("Receipt {0} already has an image")]
    ImageAlreadyAttached(String),
    #[error("Too many render requests, retry after {retry_after_ms} ms")]
    RateLimited { retry_after_ms: u64 },
    #[error("Failed to render receipt: {0}")]
    RenderFailure(String),
    #[error("Screenshot service failed: {0}")]
    UpstreamFailure(String),
}

impl ReceiptError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReceiptError::MissingParameter(_)
            | ReceiptError::InvalidAmount(_)
            | ReceiptError::InvalidAccountFormat { .. }
            | ReceiptError::InvalidStatus(_)
            | ReceiptError::InvalidTransactionId { .. }
            | ReceiptError::FieldTooLong { .. }
            | ReceiptError::InvalidRequest(_)
            | ReceiptError::InvalidImageData(_) => StatusCode::BAD_REQUEST,
            ReceiptError::UploadRejected(_) => StatusCode::FORBIDDEN,
            ReceiptError::NotFound(_) => StatusCode::NOT_FOUND,
            ReceiptError::ImageAlreadyAttached(_) => StatusCode::CONFLICT,
            ReceiptError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ReceiptError::RenderFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ReceiptError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short machine-friendly label used in the `error` field of the JSON body
    fn label(&self) -> &'static str {
        match self {
            ReceiptError::MissingParameter(_) => "Missing required parameters",
            ReceiptError::InvalidAmount(_) => "Invalid amount",
            ReceiptError::InvalidAccountFormat { .. } => "Invalid account number",
            ReceiptError::InvalidStatus(_) => "Invalid status",
            ReceiptError::InvalidTransactionId { .. } => "Invalid transaction id",
            ReceiptError::FieldTooLong { .. } => "Field too long",
            ReceiptError::InvalidRequest(_) => "Invalid request",
            ReceiptError::InvalidImageData(_) => "Invalid image data",
            ReceiptError::NotFound(_) => "Receipt not found",
            ReceiptError::UploadRejected(_) => "Upload rejected",
            ReceiptError::ImageAlreadyAttached(_) => "Image already attached",
            ReceiptError::RateLimited { .. } => "Rate limited",
            ReceiptError::RenderFailure(_) => "Failed to generate receipt",
            ReceiptError::UpstreamFailure(_) => "Screenshot service unavailable",
        }
    }
}

impl IntoResponse for ReceiptError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            warn!("Request rejected with {}: {}", status, self);
        }

        let mut body = json!({
            "success": false,
            "error": self.label(),
            "message": self.to_string(),
        });
        if let ReceiptError::MissingParameter(fields) = &self {
            body["missing"] = json!(fields);
        }

        let mut response = (status, Json(body)).into_response();
        if let ReceiptError::RateLimited { retry_after_ms } = self {
            let seconds = retry_after_ms.div_ceil(1000).max(1);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
