//! Rupee/paise resolution and en-IN number formatting.

use serde_json::Value;

/// Placeholder shown for any absent number.
pub const PLACEHOLDER: &str = "--";
pub const CURRENCY_LABEL: &str = "Rs";

const PAISE_PER_RUPEE: f64 = 100.0;
const MAX_FRACTION_DIGITS: usize = 3;

/// Parse a loosely-typed number. Strings keep only digits, `.` and `-`
/// (so `"Rs 1,250.50"` parses as `1250.5`). Anything non-finite is absent.
pub fn parse_numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

pub fn parse_numeric_str(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parse an optional slot (missing key and `null` are both absent).
pub fn parse_opt(v: Option<&Value>) -> Option<f64> {
    v.and_then(parse_numeric)
}

/// Rupees win when parseable; otherwise paise / 100; otherwise absent.
pub fn resolve_rupees(rupees: Option<&Value>, paise: Option<&Value>) -> Option<f64> {
    parse_opt(rupees).or_else(|| parse_opt(paise).map(|p| p / PAISE_PER_RUPEE))
}

/// en-IN grouping: last three integer digits, then groups of two
/// (`12,34,567.5`). At most three fraction digits, trailing zeros trimmed.
pub fn format_number(v: Option<f64>) -> String {
    match v {
        Some(n) if n.is_finite() => group_en_in(n),
        _ => PLACEHOLDER.to_string(),
    }
}

/// `Rs 1,250` or the placeholder.
pub fn format_rupees(v: Option<f64>) -> String {
    match v {
        Some(n) if n.is_finite() => format!("{CURRENCY_LABEL} {}", group_en_in(n)),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Format a raw payload value as a count.
pub fn format_count(v: Option<&Value>) -> String {
    format_number(parse_opt(v))
}

fn group_en_in(n: f64) -> String {
    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
    let head_len = digits.len().saturating_sub(3);
    let (head, tail) = digits.split_at(head_len);
    for (i, c) in head.iter().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    if !head.is_empty() {
        grouped.push(',');
    }
    grouped.extend(tail);

    let is_zero = int_part.chars().all(|c| c == '0') && frac.is_empty();
    let sign = if n < 0.0 && !is_zero { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paise_only_divides_by_hundred() {
        assert_eq!(resolve_rupees(None, Some(&json!(250))), Some(2.5));
    }

    #[test]
    fn rupees_win_over_paise() {
        assert_eq!(resolve_rupees(Some(&json!(10)), Some(&json!(99999))), Some(10.0));
        assert_eq!(resolve_rupees(Some(&json!("10")), Some(&json!("junk"))), Some(10.0));
    }

    #[test]
    fn neither_is_absent() {
        assert_eq!(resolve_rupees(None, None), None);
        assert_eq!(resolve_rupees(Some(&Value::Null), Some(&json!("n/a"))), None);
    }

    #[test]
    fn unparseable_rupees_fall_through_to_paise() {
        assert_eq!(resolve_rupees(Some(&json!("abc")), Some(&json!(1050))), Some(10.5));
    }

    #[test]
    fn strings_with_symbols_and_commas() {
        assert_eq!(parse_numeric(&json!("Rs 1,250.50")), Some(1250.5));
        assert_eq!(parse_numeric(&json!("₹ -40")), Some(-40.0));
        assert_eq!(parse_numeric(&json!("1.2.3")), None);
        assert_eq!(parse_numeric(&json!("")), None);
        assert_eq!(parse_numeric(&json!(true)), None);
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(format_number(Some(100.0)), "100");
        assert_eq!(format_number(Some(1000.0)), "1,000");
        assert_eq!(format_number(Some(100000.0)), "1,00,000");
        assert_eq!(format_number(Some(1234567.0)), "12,34,567");
        assert_eq!(format_number(Some(-1500.5)), "-1,500.5");
        assert_eq!(format_number(Some(0.1234)), "0.123");
        assert_eq!(format_number(Some(2.5)), "2.5");
    }

    #[test]
    fn absent_renders_placeholder() {
        assert_eq!(format_number(None), "--");
        assert_eq!(format_rupees(None), "--");
        assert_eq!(format_rupees(Some(2500.0)), "Rs 2,500");
        assert_eq!(format_count(Some(&json!("12"))), "12");
    }
}
