//! Chain identifier normalization.
//!
//! The Connect Kit and the provider speak chain ids as `0x` prefixed
//! hexadecimal strings while the connection state keeps them as plain
//! numbers. Every boundary crossing goes through [`parse_chain_id`].

use serde_json::Value;

use crate::error::ChainIdError;

/// Normalize a chain id from a provider response or event payload.
///
/// Accepts a JSON number or a hexadecimal string (with or without the `0x`
/// prefix, matching the permissiveness of `parseInt(value, 16)` that wallet
/// tooling commonly relies on).
pub fn parse_chain_id(value: &Value) -> Result<u64, ChainIdError> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| ChainIdError(number.to_string())),
        Value::String(text) => parse_hex_chain_id(text),
        other => Err(ChainIdError(other.to_string())),
    }
}

/// Parse a hexadecimal chain id string such as `"0x89"` into `137`.
pub fn parse_hex_chain_id(text: &str) -> Result<u64, ChainIdError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    u64::from_str_radix(digits, 16).map_err(|_| ChainIdError(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn hex_string_chain_ids() {
        assert_eq!(parse_hex_chain_id("0x1").unwrap(), 1);
        assert_eq!(parse_hex_chain_id("0x89").unwrap(), 137);
        assert_eq!(parse_hex_chain_id("0X5").unwrap(), 5);
        // no prefix is accepted the way `parseInt(x, 16)` accepts it
        assert_eq!(parse_hex_chain_id("a").unwrap(), 10);
    }

    #[test]
    fn malformed_chain_ids() {
        assert_eq!(
            parse_hex_chain_id("not-hex").unwrap_err(),
            ChainIdError("not-hex".to_owned())
        );
        assert!(parse_hex_chain_id("").is_err());
        assert!(parse_hex_chain_id("0x").is_err());
    }

    #[test]
    fn json_chain_ids() {
        assert_eq!(parse_chain_id(&json! { "0x89" }).unwrap(), 137);
        assert_eq!(parse_chain_id(&json! { 137 }).unwrap(), 137);
        assert!(parse_chain_id(&json! { -1 }).is_err());
        assert!(parse_chain_id(&json! { null }).is_err());
        assert!(parse_chain_id(&json! { ["0x1"] }).is_err());
    }
}
