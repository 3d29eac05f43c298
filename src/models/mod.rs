//! Data models for the receipt service
//!
//! Request parameters, the formatted receipt record and the JSON envelopes
//! returned by handlers.

pub mod app_state;
pub mod receipt;
pub mod responses;

pub use app_state::AppState;
pub use receipt::{ReceiptParams, ReceiptRecord, ReceiptStatus};
pub use responses::{
    Envelope, GeneratedImageAck, GeneratedImageUpload, HealthStatus, ReceiptHtmlData,
    ReceiptImageData,
};
