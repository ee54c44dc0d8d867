//! Lenient parsing and display of currency amounts typed into forms

/// Parse a free-text amount such as `"R 350 000"`, `"12,5"` or `"1,250.00"`.
///
/// Never fails:
/// - everything except digits, `.`, `,` and a leading `-` is discarded
/// - with a `.` present, commas are thousands separators
/// - a single comma and no `.` is the decimal mark
/// - several commas and no `.` are thousands separators
/// - anything unparseable or non-finite yields `0.0`
pub fn parse_amount(text: &str) -> f64 {
    let negative = text
        .chars()
        .find(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        == Some('-');

    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
        .collect();

    let commas = kept.matches(',').count();
    let normalized = if kept.contains('.') || commas > 1 {
        kept.replace(',', "")
    } else {
        kept.replace(',', ".")
    };

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if negative {
                -value
            } else {
                value
            }
        }
        _ => 0.0,
    }
}

/// Non-finite and negative amounts count as zero
pub fn clean_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Parse a free-text whole number (counts, months, ages), truncating decimals
pub fn parse_count(text: &str) -> u32 {
    let value = parse_amount(text);
    if value <= 0.0 {
        0
    } else {
        value.min(u32::MAX as f64) as u32
    }
}

/// Parse a yes/no style flag
pub fn parse_flag(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "true" | "on" | "x"
    )
}

/// Format an amount as rand with two decimals and thousands separators,
/// e.g. `R 54,797.00`
pub fn format_rand(value: f64) -> String {
    if !value.is_finite() {
        return "R 0.00".to_string();
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R {}.{:02}", sign, grouped, fraction)
}

/// Format a fraction as a percentage with two decimals
pub fn format_percent(fraction: f64) -> String {
    if !fraction.is_finite() {
        return "0.00%".to_string();
    }
    format!("{:.2}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_formatted() {
        assert_eq!(parse_amount("350000"), 350_000.0);
        assert_eq!(parse_amount("R 350 000"), 350_000.0);
        assert_eq!(parse_amount("R350,000.50"), 350_000.5);
        assert_eq!(parse_amount("  1 250.75 "), 1_250.75);
    }

    #[test]
    fn test_parse_comma_decimal() {
        assert_eq!(parse_amount("12,5"), 12.5);
        assert_eq!(parse_amount("R 1 234,56"), 1_234.56);
        // Several commas are grouping, not decimals
        assert_eq!(parse_amount("1,250,000"), 1_250_000.0);
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(parse_amount("-500"), -500.0);
        assert_eq!(parse_amount("R -1,000.00"), -1_000.0);
        // A dash after the digits is not a sign
        assert_eq!(parse_amount("100-"), 100.0);
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("1.2.3"), 0.0);
        assert_eq!(parse_amount("."), 0.0);
    }

    #[test]
    fn test_parse_count_and_flag() {
        assert_eq!(parse_count("3"), 3);
        assert_eq!(parse_count("2.9"), 2);
        assert_eq!(parse_count("-4"), 0);
        assert_eq!(parse_count("n/a"), 0);
        assert!(parse_flag("Yes"));
        assert!(parse_flag(" true "));
        assert!(!parse_flag("no"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_clean_amount() {
        assert_eq!(clean_amount(12.5), 12.5);
        assert_eq!(clean_amount(-1.0), 0.0);
        assert_eq!(clean_amount(f64::NAN), 0.0);
        assert_eq!(clean_amount(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_format_rand() {
        assert_eq!(format_rand(54_797.0), "R 54,797.00");
        assert_eq!(format_rand(4_566.416), "R 4,566.42");
        assert_eq!(format_rand(0.0), "R 0.00");
        assert_eq!(format_rand(999.999), "R 1,000.00");
        assert_eq!(format_rand(1_234_567.8), "R 1,234,567.80");
        assert_eq!(format_rand(-250.5), "-R 250.50");
        assert_eq!(format_rand(f64::NAN), "R 0.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.1234), "12.34%");
        assert_eq!(format_percent(f64::INFINITY), "0.00%");
    }
}
