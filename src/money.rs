//! Currency parsing and display formatting.
//!
//! Source files carry monetary amounts as decorated text (`"$1,234,567.89"`).
//! [`parse_currency`] is the single normalization rule used by the loader;
//! the formatting helpers are the inverse used by the UI.

/// Parse a currency-decorated string into a numeric amount.
///
/// Strips every `$` and `,`, trims whitespace, then parses the remainder as
/// `f64`. Returns `None` for anything that still fails to parse (`"N/A"`,
/// empty cells, stray text). Malformed cells are tolerated individually,
/// never escalated to a batch failure.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Format an amount as `$1,234,567.89` (`-$…` for negatives).
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), "00"),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${grouped}.{frac_part}")
    } else {
        format!("${grouped}.{frac_part}")
    }
}

/// Format a ratio (`0.2333…`) as a percentage (`23.33%`).
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decorated_and_plain_amounts() {
        assert_eq!(parse_currency("$1,234.50"), Some(1234.50));
        assert_eq!(parse_currency("1234.50"), Some(1234.50));
        assert_eq!(parse_currency("$1,234"), Some(1234.0));
        assert_eq!(parse_currency("  $2,000,000  "), Some(2_000_000.0));
    }

    #[test]
    fn malformed_cells_become_missing() {
        assert_eq!(parse_currency("N/A"), None);
        assert_eq!(parse_currency(""), None);
        assert_eq!(parse_currency("   "), None);
        assert_eq!(parse_currency("$"), None);
        assert_eq!(parse_currency("12 34"), None);
    }

    #[test]
    fn formats_with_thousands_grouping() {
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(-45_000.5), "-$45,000.50");
    }

    #[test]
    fn formats_percentages() {
        assert_eq!(format_percent(0.2333333), "23.33%");
        assert_eq!(format_percent(1.0), "100.00%");
    }
}
