//! Text formatting of monetary values as the statement formats expect them.

/// Formats with exactly two decimals and no thousands separators, e.g. `-60000.00`.
pub fn fixed(value: f64) -> String {
    format!("{:.2}", normalize(value))
}

/// Formats with two decimals and comma thousands separators, e.g. `-60,000.00`.
pub fn grouped(value: f64) -> String {
    let value = normalize(value);
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}", format_num::format_num!(",.2", value.abs()))
}

/// Maps negative zero (and values that would print as `-0.00`) to zero.
fn normalize(value: f64) -> f64 {
    if value.abs() < 0.005 {
        0.0
    } else {
        value
    }
}
