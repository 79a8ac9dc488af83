use chrono::Utc;
use mesob_common::Birr;

use crate::GatewayApiError;

/// Chapa expresses amounts as decimal strings with at most two fraction digits.
pub fn parse_birr_price(price: &str) -> Result<Birr, GatewayApiError> {
    let trimmed = price.trim();
    let (sign, magnitude) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed),
    };
    let mut parts = magnitude.splitn(2, '.');
    let whole_units = parts
        .next()
        .ok_or_else(|| GatewayApiError::InvalidCurrencyAmount(price.to_string()))?
        .parse::<i64>()
        .map_err(|e| GatewayApiError::InvalidCurrencyAmount(format!("Invalid price value: {price}. {e}.")))?;
    let santim = match parts.next() {
        None => 0,
        Some(frac) if frac.len() == 1 || frac.len() == 2 => {
            let v = frac
                .parse::<i64>()
                .map_err(|e| GatewayApiError::InvalidCurrencyAmount(format!("Invalid price value: {price}. {e}.")))?;
            if frac.len() == 1 {
                10 * v
            } else {
                v
            }
        },
        Some(_) => {
            return Err(GatewayApiError::InvalidCurrencyAmount(format!(
                "Invalid price value: {price}. At most two fraction digits are supported."
            )))
        },
    };
    Ok(Birr::from(sign * (100 * whole_units + santim)))
}

/// Builds the transaction reference sent to the gateway for an order. The millisecond suffix
/// keeps references unique across payment retries for the same order.
pub fn new_tx_ref(order_id: i64) -> String {
    format!("order-{order_id}-{}", Utc::now().timestamp_millis())
}
