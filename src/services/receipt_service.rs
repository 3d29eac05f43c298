use chrono::{Datelike, Timelike};

use crate::config::RecipientAccountDisplay;
use crate::models::{ReceiptParams, ReceiptRecord, ReceiptStatus};
use crate::services::format_service;
use crate::utils::errors::ReceiptError;

const ACCOUNT_NUMBER_LEN: usize = 10;

/// Longest name or bank accepted; keeps the canvas layout bounded
pub const MAX_TEXT_FIELD_LEN: usize = 64;

pub const MAX_TRANSACTION_ID_LEN: usize = 32;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn validate_length(value: &str, field: &'static str) -> Result<(), ReceiptError> {
    if value.chars().count() > MAX_TEXT_FIELD_LEN {
        return Err(ReceiptError::FieldTooLong {
            field,
            max: MAX_TEXT_FIELD_LEN,
        });
    }
    Ok(())
}

/// Caller-supplied ids end up in URLs and headers, so only URL-safe characters pass
fn validate_transaction_id(raw: &str) -> Result<(), ReceiptError> {
    let valid = raw.len() <= MAX_TRANSACTION_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(ReceiptError::InvalidTransactionId {
            max: MAX_TRANSACTION_ID_LEN,
        })
    }
}

fn validate_account(raw: &str, field: &'static str) -> Result<(), ReceiptError> {
    if raw.len() == ACCOUNT_NUMBER_LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ReceiptError::InvalidAccountFormat { field })
    }
}

/// Validate raw parameters and format them into a receipt record
pub fn build_record<T: Datelike + Timelike>(
    params: &ReceiptParams,
    recipient_display: RecipientAccountDisplay,
    now: &T,
) -> Result<ReceiptRecord, ReceiptError> {
    let required = [
        ("senderName", present(&params.sender_name)),
        ("senderAccountNumber", present(&params.sender_account_number)),
        ("recipientName", present(&params.recipient_name)),
        ("recipientBank", present(&params.recipient_bank)),
        ("recipientAccountNumber", present(&params.recipient_account_number)),
        ("amount", present(&params.amount)),
    ];

    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(ReceiptError::MissingParameter(missing));
    }

    let [sender_name, sender_account, recipient_name, recipient_bank, recipient_account, amount] =
        required.map(|(_, value)| value.unwrap_or_default());

    validate_length(sender_name, "senderName")?;
    validate_length(recipient_name, "recipientName")?;
    validate_length(recipient_bank, "recipientBank")?;
    validate_account(sender_account, "senderAccountNumber")?;
    validate_account(recipient_account, "recipientAccountNumber")?;

    let amount_formatted = format_service::format_amount(amount)?;

    let status = match present(&params.status) {
        Some(raw) => {
            ReceiptStatus::parse(raw).ok_or_else(|| ReceiptError::InvalidStatus(raw.to_string()))?
        }
        None => ReceiptStatus::Successful,
    };

    let transaction_id = match present(&params.transaction_id) {
        Some(id) => {
            validate_transaction_id(id)?;
            id.to_string()
        }
        None => format_service::generate_transaction_id(now),
    };

    let recipient_account = match recipient_display {
        RecipientAccountDisplay::Full => recipient_account.to_string(),
        RecipientAccountDisplay::Masked => format_service::mask_account(recipient_account),
    };

    Ok(ReceiptRecord {
        sender_name: sender_name.to_uppercase(),
        sender_account_masked: format_service::mask_account(sender_account),
        recipient_name: recipient_name.to_uppercase(),
        recipient_bank: recipient_bank.to_string(),
        recipient_account,
        amount_formatted,
        transaction_id,
        status,
        transaction_date: format_service::format_date(now),
    })
}

#[cfg(test)]
pub(crate) fn sample_params() -> ReceiptParams {
    ReceiptParams {
        sender_name: Some("John Doe".into()),
        sender_account_number: Some("9123456789".into()),
        recipient_name: Some("Jane Smith".into()),
        recipient_bank: Some("Access Bank".into()),
        recipient_account_number: Some("9876543210".into()),
        amount: Some("5000".into()),
        transaction_id: None,
        status: None,
    }
}
