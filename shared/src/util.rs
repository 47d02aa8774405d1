/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Convert a decimal amount to integer minor units (cents), rounding half away from zero.
///
/// Returns `None` if the amount is negative or does not fit in `i64`.
pub fn to_minor_units(amount: rust_decimal::Decimal) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;
    if amount.is_sign_negative() {
        return None;
    }
    (amount * rust_decimal::Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
