//! Human-readable token amounts.

use alloy_primitives::utils::{format_units, parse_units, ParseUnits};
use alloy_primitives::{Address, U256};

use crate::error::StreamError;

/// Render `amount` base units as a decimal string with trailing zeros removed.
///
/// `1_000_000` with 6 decimals is `"1"`, `1_500_000` is `"1.5"`.
pub fn format_units_trimmed(amount: U256, decimals: u8) -> String {
    let raw = match format_units(amount, decimals) {
        Ok(s) => s,
        // decimals beyond the unit range; show base units
        Err(_) => return amount.to_string(),
    };
    if !raw.contains('.') {
        return raw;
    }
    let trimmed = raw.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `format_units_trimmed` followed by the token symbol: `"12.5 cUSD"`.
pub fn format_amount(amount: U256, decimals: u8, symbol: &str) -> String {
    format!("{} {}", format_units_trimmed(amount, decimals), symbol)
}

/// Parse a decimal amount typed by a user into base units.
pub fn parse_amount(text: &str, decimals: u8) -> Result<U256, StreamError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(StreamError::validation("amount is required"));
    }
    match parse_units(text, decimals) {
        Ok(ParseUnits::U256(v)) => Ok(v),
        Ok(ParseUnits::I256(_)) => Err(StreamError::validation("amount cannot be negative")),
        Err(e) => Err(StreamError::validation(format!("invalid amount '{text}': {e}"))),
    }
}

/// `0x1234…abcd` form for compact display.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
