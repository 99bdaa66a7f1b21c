//! Decimal amounts to integer base units.

use alloy_primitives::{
    utils::{self, ParseUnits},
    U256,
};

use crate::error::AmountError;

pub const ETHER_DECIMALS: u8 = 18;

/// Converts a decimal string such as `"1.234"` into base units with `decimals`
/// fractional digits. Negative amounts are rejected.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, AmountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AmountError::Empty);
    }
    match utils::parse_units(value, decimals) {
        Ok(ParseUnits::U256(amount)) => Ok(amount),
        Ok(ParseUnits::I256(_)) => Err(AmountError::Negative(value.to_string())),
        Err(err) => Err(AmountError::Invalid {
            value: value.to_string(),
            reason: err.to_string(),
        }),
    }
}

pub fn parse_ether(value: &str) -> Result<U256, AmountError> {
    parse_units(value, ETHER_DECIMALS)
}

/// `0x`-prefixed lowercase hex, as token transfer arguments are encoded.
pub fn to_hex(amount: U256) -> String {
    format!("0x{amount:x}")
}
