/// Renders an amount with two decimals and a leading sign for negatives: `-$4.50`.
pub fn format_currency(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded < 0.0 {
        format!("-${:.2}", -rounded)
    } else {
        format!("${:.2}", rounded.abs())
    }
}
