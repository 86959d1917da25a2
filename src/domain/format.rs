//! Display helpers shared by the render composer and the list tables

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Fixed decimal scale of CKB balances returned by the REST API
pub const CKB_DECIMALS: u8 = 18;

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// `true` for a 20-byte hex address. Mixed-case input must carry a valid EIP-55 checksum.
pub fn is_eth_address(value: &str) -> bool {
    let Some(payload) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) else {
        return false;
    };
    if payload.len() != 40 || hex::decode(payload).is_err() {
        return false;
    }
    let has_lower = payload.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = payload.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(value, None).is_ok();
    }
    Address::from_str(value).is_ok()
}

/// `true` for a 32-byte hex hash (script hash, block hash, tx hash)
pub fn is_hash(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .map(|payload| payload.len() == 64 && hex::decode(payload).is_ok())
        .unwrap_or(false)
}

/// Middle-truncate long hex strings: `0x123456...89abcdef`
pub fn truncate_middle(value: &str, leading: usize) -> String {
    if value == ZERO_ADDRESS {
        return "zero address".to_string();
    }
    if value.starts_with("0x") && value.len() > leading * 2 && value.is_ascii() {
        format!("{}...{}", &value[..leading], &value[value.len() - leading..])
    } else {
        value.to_string()
    }
}

/// Thousands separators: `1234567` -> `1,234,567`
pub fn format_int(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Scale a decimal string (`"12.5"`) by `10^decimals` into an integer string.
/// Returns `None` for anything that is not a plain non-negative decimal.
pub fn scale_decimal(value: &str, decimals: u8) -> Option<String> {
    let value = value.trim();
    let (whole, frac) = match value.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (value, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let decimals = decimals as usize;
    // Digits beyond the scale are dropped, not rounded.
    let frac: String = frac.chars().chain(std::iter::repeat('0')).take(decimals).collect();
    let digits = format!("{whole}{frac}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some("0".to_string());
    }
    U256::from_str_radix(digits, 10).ok().map(|v| v.to_string())
}

/// Format an integer amount in the smallest unit with the given decimals
pub fn format_units(amount: &str, decimals: u8) -> Option<String> {
    let value = U256::from_str_radix(amount.trim(), 10).ok()?;
    if decimals == 0 {
        return Some(value.to_string());
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let frac = value % divisor;

    if frac.is_zero() {
        return Some(whole.to_string());
    }
    let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    Some(format!("{}.{}", whole, trimmed))
}

/// Parse the timestamp shapes the backend emits: unix seconds, unix millis or ISO-8601
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // Anything past year 33658 in seconds is really milliseconds.
            if raw > 1_000_000_000_000 {
                DateTime::from_timestamp_millis(raw)
            } else {
                DateTime::from_timestamp(raw, 0)
            }
        }
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

pub fn format_datetime(value: &Value) -> Option<String> {
    parse_timestamp(value).map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// Relative age such as `42 secs ago` or `3 days ago`
pub fn time_distance(value: &Value, now: DateTime<Utc>) -> Option<String> {
    let then = parse_timestamp(value)?;
    let secs = (now - then).num_seconds().max(0);
    let (amount, unit) = match secs {
        s if s < 60 => (s, "sec"),
        s if s < 3_600 => (s / 60, "min"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s => (s / 86_400, "day"),
    };
    let plural = if amount == 1 { "" } else { "s" };
    Some(format!("{amount} {unit}{plural} ago"))
}

/// Block/transaction finality as shown in lists
pub fn block_status(status: Option<&str>) -> &'static str {
    match status.map(|s| s.to_ascii_lowercase()) {
        Some(s) if s == "committed" => "committed",
        Some(s) if s == "finalized" => "finalized",
        _ => "pending",
    }
}
