/// Round `value` to `decimals` places, half away from zero.
///
/// # Examples
///
/// ```
/// use shift_core::formatting::round_to;
///
/// assert_eq!(round_to(1.005_1, 2), 1.01);
/// assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Average machining minutes per produced part, rounded to two places.
///
/// Returns `0.0` when no part was produced; that is a display fallback for
/// empty cells, not a measured value.
///
/// # Examples
///
/// ```
/// use shift_core::formatting::minutes_per_part;
///
/// assert_eq!(minutes_per_part(10, 4), 2.5);
/// assert_eq!(minutes_per_part(10, 3), 3.33);
/// assert_eq!(minutes_per_part(25, 0), 0.0);
/// ```
pub fn minutes_per_part(minutes: u64, parts: u64) -> f64 {
    if parts == 0 {
        return 0.0;
    }
    round_to(minutes as f64 / parts as f64, 2)
}

/// Render a minutes-per-part ratio: `"0"` for the empty case, otherwise
/// always two decimals.
pub fn format_ratio(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use shift_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a cell as `"<parts> / <minutes>m"`, the compact form used in the
/// pivot view.
pub fn format_cell(parts: u64, minutes: u64) -> String {
    format!("{} / {}m", format_count(parts), format_count(minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_per_part_zero_parts() {
        assert_eq!(minutes_per_part(0, 0), 0.0);
        assert_eq!(minutes_per_part(120, 0), 0.0);
    }

    #[test]
    fn test_minutes_per_part_rounds_two_places() {
        assert_eq!(minutes_per_part(2, 2), 1.0);
        assert_eq!(minutes_per_part(10, 1), 10.0);
        assert_eq!(minutes_per_part(1, 3), 0.33);
        assert_eq!(minutes_per_part(2, 3), 0.67);
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(0.0), "0");
        assert_eq!(format_ratio(2.5), "2.50");
        assert_eq!(format_ratio(0.33), "0.33");
    }

    #[test]
    fn test_format_count_grouping() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(12_345), "12,345");
        assert_eq!(format_count(100_000), "100,000");
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(8, 1250), "8 / 1,250m");
    }
}
