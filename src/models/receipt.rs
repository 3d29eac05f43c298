//! Receipt models

use serde::{Deserialize, Serialize};

/// Raw receipt fields as they arrive in a query string or JSON body.
/// Everything is optional so that validation can report all gaps at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptParams {
    pub sender_name: Option<String>,
    #[serde(alias = "senderAccount")]
    pub sender_account_number: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_bank: Option<String>,
    #[serde(alias = "recipientAccount")]
    pub recipient_account_number: Option<String>,
    pub amount: Option<String>,
    pub transaction_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ReceiptStatus {
    #[default]
    Successful,
    Pending,
    Failed,
}

impl ReceiptStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReceiptStatus::Successful => "Successful",
            ReceiptStatus::Pending => "Pending",
            ReceiptStatus::Failed => "Failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "successful" => Some(ReceiptStatus::Successful),
            "pending" => Some(ReceiptStatus::Pending),
            "failed" => Some(ReceiptStatus::Failed),
            _ => None,
        }
    }

    /// RGB accent used for the status line on the canvas and in HTML
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            ReceiptStatus::Successful => (0x1D, 0xA0, 0x6A),
            ReceiptStatus::Pending => (0xE0, 0x8E, 0x0B),
            ReceiptStatus::Failed => (0xD6, 0x33, 0x33),
        }
    }
}

/// Fully formatted receipt, ready for any renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    pub sender_name: String,
    pub sender_account_masked: String,
    pub recipient_name: String,
    pub recipient_bank: String,
    pub recipient_account: String,
    pub amount_formatted: String,
    pub transaction_id: String,
    pub status: ReceiptStatus,
    pub transaction_date: String,
}

impl ReceiptRecord {
    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_closed_set() {
        assert_eq!(ReceiptStatus::parse(" Successful "), Some(ReceiptStatus::Successful));
        assert_eq!(ReceiptStatus::parse("PENDING"), Some(ReceiptStatus::Pending));
        assert_eq!(ReceiptStatus::parse("failed"), Some(ReceiptStatus::Failed));
        assert_eq!(ReceiptStatus::parse("success"), None);
        assert_eq!(ReceiptStatus::parse("reversed"), None);
    }
}
