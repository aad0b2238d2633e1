use super::allocation::round_half_up;

/// Quote price per unit, or 0 when either the total or the quantity is 0.
pub fn unit_quote_price(total_quote_price: f64, quantity: i64) -> i64 {
    if total_quote_price == 0.0 || quantity == 0 {
        return 0;
    }
    round_half_up(total_quote_price / quantity as f64)
}

/// Margin in percent of the quote. `None` when there is no quote to measure
/// against.
pub fn margin_rate(total_quote_price: f64, manufacturing_cost: f64) -> Option<f64> {
    if total_quote_price == 0.0 {
        return None;
    }
    Some((total_quote_price - manufacturing_cost) * 100.0 / total_quote_price)
}
