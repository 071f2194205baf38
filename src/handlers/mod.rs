pub mod order_lines;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::errors::AppError;

/// Decimal fields cross the wire as strings, e.g. `"19.99"`; an unparseable
/// value is the caller's mistake, not a server fault.
pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid {} '{}': {}", field, raw, e)))
}
