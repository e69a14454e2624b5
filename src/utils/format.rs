/// Format a currency amount for display with two decimal places.
/// Amounts are rupee-denominated throughout the backend.
pub fn format_amount(amount: f64) -> String {
    format!("₹{:.2}", amount)
}

/// Format a balance with an explicit sign, for the members table.
/// Positive means the group owes the member, negative the reverse.
pub fn format_signed_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("-₹{:.2}", -amount)
    } else {
        format!("+₹{:.2}", amount)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
