use ethers::types::Address;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Decimals of the base units used by raw-unit airdrop CSVs
pub const RAW_UNIT_DECIMALS: u32 = 18;

// Amounts are never parsed through f64
pub fn parse_amount(s: &str) -> Result<Decimal, ConversionError> {
    let trimmed = s.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| ConversionError::InvalidDecimal(format!("{}: {}", trimmed, e)))
}

/// Shifts an integer amount expressed in base units into token units.
pub fn raw_to_token_amount(raw: Decimal, decimals: u32) -> Result<Decimal, ConversionError> {
    let mut value = raw;
    value
        .set_scale(raw.scale() + decimals)
        .map_err(|_| ConversionError::Overflow)?;
    Ok(value.normalize())
}

pub fn address_to_checksum(addr: &Address) -> String {
    ethers::utils::to_checksum(addr, None)
}

pub fn string_to_address(s: &str) -> Result<Address, ConversionError> {
    Address::from_str(s.trim()).map_err(|e| ConversionError::InvalidAddress(format!("{}: {}", s, e)))
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),
    #[error("Overflow in conversion")]
    Overflow,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_to_token_amount() {
        let raw = parse_amount("16301717650649890035791").unwrap();
        let amount = raw_to_token_amount(raw, RAW_UNIT_DECIMALS).unwrap();
        assert_eq!(amount.to_string(), "16301.717650649890035791");

        let raw = parse_amount("1000000000000000000").unwrap();
        assert_eq!(raw_to_token_amount(raw, RAW_UNIT_DECIMALS).unwrap().to_string(), "1");
    }

    #[test]
    fn test_parse_amount_keeps_precision() {
        let amount = parse_amount("630.374421472277638654").unwrap();
        assert_eq!(amount.to_string(), "630.374421472277638654");
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_address_round_trip() {
        let addr = string_to_address("0x2b888954421b424c5d3d9ce9bb67c9bd47537d12").unwrap();
        let checksummed = address_to_checksum(&addr);
        assert_ne!(checksummed, checksummed.to_lowercase());
        assert_eq!(string_to_address(&checksummed).unwrap(), addr);
        assert!(string_to_address("0x1234").is_err());
    }
}
