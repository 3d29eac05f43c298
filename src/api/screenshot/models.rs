use serde::{Deserialize, Serialize};

/// Request body for the HTML-to-image endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ScreenshotRequest<'a> {
    pub html: &'a str,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub device_scale: u32,
}

/// Error body some providers return alongside non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Why a single attempt against one key failed
#[derive(Debug, Clone)]
pub enum AttemptError {
    /// Non-2xx status with the provider's message
    Http(u16, String),
    /// Connection failure or timeout
    Request(String),
    /// 2xx but nothing usable in the body
    EmptyBody,
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            AttemptError::Request(msg) => write!(f, "Request error: {}", msg),
            AttemptError::EmptyBody => write!(f, "Empty image body"),
        }
    }
}
