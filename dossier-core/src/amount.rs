//! Vietnamese-style amount parsing and display formatting.
//!
//! Form amounts travel as strings ("1.500.000", "2,25") so half-typed and
//! empty fields stay representable. Dots group thousands, the comma is the
//! decimal separator. Anything that does not parse is worth zero; amount
//! handling must never fail a mutation or a render.

use regex::Regex;
use std::sync::OnceLock;

fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?[0-9][0-9.,]*").unwrap())
}

/// Parse an amount string into a number.
///
/// Separator rules, applied to the leading numeric token:
/// - both '.' and ',' present: dots are grouping, the comma is the decimal
///   point ("1.500,75" -> 1500.75)
/// - a single '.' or ',' is the decimal point ("1.500" -> 1.5, "2,25" -> 2.25)
/// - a repeated separator is grouping ("1.500.000" -> 1500000)
///
/// Trailing text after the number is ignored ("2,25 tỷ" -> 2.25). A string
/// with no digits parses to zero.
pub fn parse_amount(value: &str) -> f64 {
    let trimmed = value.trim();
    let Some(m) = leading_number_re().find(trimmed) else {
        return 0.0;
    };
    let token = m.as_str().trim_end_matches(['.', ',']);

    let dots = token.matches('.').count();
    let commas = token.matches(',').count();

    let normalized = if commas > 0 && dots > 0 {
        token.replace('.', "").replace(',', ".")
    } else if dots == 1 {
        token.to_string()
    } else if commas == 1 {
        token.replace(',', ".")
    } else {
        // zero or repeated separators of one kind: grouping only
        token.replace(['.', ','], "")
    };

    normalized.parse::<f64>().unwrap_or(0.0)
}

/// Sum a collection of amount strings.
pub fn sum_amounts<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().map(parse_amount).sum()
}

/// Format a number in Vietnamese display style: '.' thousands grouping,
/// ',' decimal separator, at most three fractional digits.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let grouped = group_thousands(int_part);
    let negative = value < 0.0 && (int_part != "0" || !frac.is_empty());
    let sign = if negative { "-" } else { "" };

    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{frac}")
    }
}

fn group_thousands(digits: &str) -> String {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(*b as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(parse_amount("2,25"), 2.25);
        assert_eq!(parse_amount("0,5"), 0.5);
    }

    #[test]
    fn test_parse_single_dot_is_decimal() {
        assert_eq!(parse_amount("1.500"), 1.5);
        assert_eq!(parse_amount("1.5"), 1.5);
    }

    #[test]
    fn test_parse_repeated_dots_are_grouping() {
        assert_eq!(parse_amount("1.500.000"), 1_500_000.0);
        assert_eq!(parse_amount("12.345.678"), 12_345_678.0);
    }

    #[test]
    fn test_parse_mixed_separators() {
        assert_eq!(parse_amount("1.500,75"), 1500.75);
    }

    #[test]
    fn test_parse_ignores_trailing_text() {
        assert_eq!(parse_amount("2,25 tỷ"), 2.25);
        assert_eq!(parse_amount("  1.500.000 VNĐ"), 1_500_000.0);
    }

    #[test]
    fn test_parse_no_digits_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("chưa có"), 0.0);
        assert_eq!(parse_amount("..."), 0.0);
    }

    #[test]
    fn test_sum_is_order_independent() {
        let a = sum_amounts(["1.500", "2,25", "0,25"]);
        let b = sum_amounts(["0,25", "1.500", "2,25"]);
        assert_eq!(a, b);
        assert_eq!(a, 4.0);
    }

    #[test]
    fn test_mixed_list_total_renders_nonzero() {
        // "1.500" and "2,25" parse to 1.5 and 2.25; the total renders as a
        // nonzero string, not a placeholder.
        let total = sum_amounts(["1.500", "2,25"]);
        assert_eq!(total, 3.75);
        assert_eq!(format_amount(total), "3,75");
    }

    #[test]
    fn test_format_grouping() {
        assert_eq!(format_amount(1_500_000.0), "1.500.000");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1.000");
    }

    #[test]
    fn test_format_truncates_to_three_decimals() {
        assert_eq!(format_amount(1.23456), "1,235");
        assert_eq!(format_amount(2.5), "2,5");
    }
}
