use chrono::{Datelike, Timelike};
use rand::Rng;

use crate::utils::errors::ReceiptError;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Channel segment placed between the timestamp and the random suffix
const TRANSACTION_ID_LITERAL: &str = "01";

/// Total length of a generated transaction id
pub const TRANSACTION_ID_LEN: usize = 6 + 6 + TRANSACTION_ID_LITERAL.len() + 6;

/// Mask an account number, keeping the first and last three characters
/// "9123456789" -> "912****789"
pub fn mask_account(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < 6 {
        return raw.to_string();
    }

    let mut masked = String::with_capacity(raw.len());
    masked.extend(&chars[..3]);
    masked.push_str(&"*".repeat(chars.len() - 6));
    masked.extend(&chars[chars.len() - 3..]);
    masked
}

/// Amounts at or above this are rejected so the rendered figure stays readable
const MAX_AMOUNT: f64 = 1e15;

/// Drop thousands separators, but only when every comma sits between
/// well-formed groups of three digits: "12,500.5" passes, "1,2,3" does not
fn strip_grouping(raw: &str) -> Option<String> {
    if !raw.contains(',') {
        return Some(raw.to_string());
    }

    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if frac_part.contains(',') {
        return None;
    }

    let mut groups = int_part.split(',');
    let head_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    let tail_ok = groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()));

    (head_ok && tail_ok).then(|| raw.replace(',', ""))
}

/// Format an amount with two decimals and comma thousands grouping
/// "1234567.5" -> "1,234,567.50"
pub fn format_amount(raw: &str) -> Result<String, ReceiptError> {
    let invalid = || ReceiptError::InvalidAmount(raw.to_string());

    let cleaned = strip_grouping(raw.trim()).ok_or_else(invalid)?;
    let value: f64 = cleaned.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value.abs() >= MAX_AMOUNT {
        return Err(invalid());
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // "-0.00" is not worth showing
    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    Ok(format!("{}{}.{}", sign, grouped, frac_part))
}

/// Build a display transaction id: YYMMDD HHMMSS literal random(6), digits only
pub fn generate_transaction_id<T: Datelike + Timelike>(now: &T) -> String {
    let random: u32 = rand::thread_rng().gen_range(0..1_000_000);
    let id = format!(
        "{:02}{:02}{:02}{:02}{:02}{:02}{}{:06}",
        now.year().rem_euclid(100),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        TRANSACTION_ID_LITERAL,
        random
    );
    debug_assert_eq!(id.len(), TRANSACTION_ID_LEN);
    id
}

pub fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// "Oct 16th, 2026 09:05:03"
pub fn format_date<T: Datelike + Timelike>(date: &T) -> String {
    let day = date.day();
    format!(
        "{} {}{}, {} {:02}:{:02}:{:02}",
        MONTHS[date.month0() as usize],
        day,
        ordinal_suffix(day),
        date.year(),
        date.hour(),
        date.minute(),
        date.second()
    )
}
