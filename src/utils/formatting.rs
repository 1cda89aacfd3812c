//! Text formatting utilities for the pin map engine.
//!
//! This module provides helper functions for formatting prices in a
//! human-readable way.

/// Formats an amount with thousands separators for readability.
///
/// # Examples
/// ```
/// use pinmap::utils::formatting::format_amount;
/// assert_eq!(format_amount(1000), "1,000");
/// assert_eq!(format_amount(1234567), "1,234,567");
/// ```
pub fn format_amount(amount: u64) -> String {
    let s = amount.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();
    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }
    result
}

/// Formats a won amount in the compact 억/만 form used on markers and in
/// hover summaries.
///
/// # Examples
/// ```
/// use pinmap::utils::formatting::format_price_compact;
/// assert_eq!(format_price_compact(320_000_000), "3억 2,000");
/// assert_eq!(format_price_compact(300_000_000), "3억");
/// assert_eq!(format_price_compact(55_000_000), "5,500만");
/// assert_eq!(format_price_compact(9_000), "9,000");
/// ```
pub fn format_price_compact(won: u64) -> String {
    const EOK: u64 = 100_000_000;
    const MAN: u64 = 10_000;

    if won >= EOK {
        let eok = won / EOK;
        let remainder_man = (won % EOK) / MAN;
        if remainder_man == 0 {
            format!("{}억", eok)
        } else {
            format!("{}억 {}", eok, format_amount(remainder_man))
        }
    } else if won >= MAN {
        format!("{}만", format_amount(won / MAN))
    } else {
        format_amount(won)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_grouping() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1_000), "1,000");
        assert_eq!(format_amount(120_000), "120,000");
    }

    #[test]
    fn test_format_price_compact_units() {
        assert_eq!(format_price_compact(1_500_000_000), "15억");
        assert_eq!(format_price_compact(125_000_000), "1억 2,500");
        assert_eq!(format_price_compact(10_000), "1만");
        assert_eq!(format_price_compact(500), "500");
    }
}
