//! Number formatting for display.

/// Fixed decimals with `,` thousands separators: `4527594.66` → `4,527,594.66`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value.is_sign_negative() && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        grouped.push('-');
    }
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

pub fn format_rmse(value: f64) -> String {
    format_grouped(value, 3)
}

pub fn format_money(value: f64) -> String {
    format_grouped(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_grouped(4_527_594.66, 2), "4,527,594.66");
        assert_eq!(format_grouped(1000.0, 0), "1,000");
        assert_eq!(format_grouped(999.999, 2), "1,000.00");
        assert_eq!(format_grouped(12.0, 3), "12.000");
    }

    #[test]
    fn keeps_sign() {
        assert_eq!(format_grouped(-1234.5, 1), "-1,234.5");
        assert_eq!(format_grouped(-0.001, 2), "0.00");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(format_grouped(f64::NAN, 2), "nan");
        assert_eq!(format_grouped(f64::INFINITY, 2), "inf");
        assert_eq!(format_grouped(f64::NEG_INFINITY, 2), "-inf");
    }

    #[test]
    fn metric_precisions() {
        assert_eq!(format_rmse(14.5_f64.sqrt()), "3.808");
        assert_eq!(format_money(125.0), "125.00");
    }
}
