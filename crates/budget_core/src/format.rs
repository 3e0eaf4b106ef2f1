/// Currency prefix for every displayed amount.
pub const CURRENCY: &str = "$";

/// Formats an amount with two decimals, e.g. `$180.00`. Non-finite values show as zero.
pub fn format_money(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{CURRENCY}{value:.2}")
}

/// Formats a percentage with one decimal, e.g. `25.0%`.
pub fn format_percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.1}%")
}
