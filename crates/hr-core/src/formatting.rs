/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use hr_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact binary midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // "0.50" -> ".50"
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a head count with thousands separators.
///
/// ```
/// use hr_core::formatting::format_count;
///
/// assert_eq!(format_count(1520), "1,520");
/// ```
pub fn format_count(value: u32) -> String {
    group_thousands(&value.to_string())
}

/// Format a rate expressed as a fraction (`0.123`) as a percentage string.
///
/// ```
/// use hr_core::formatting::format_percent;
///
/// assert_eq!(format_percent(0.123, 1), "12.3%");
/// assert_eq!(format_percent(0.0, 0), "0%");
/// ```
pub fn format_percent(rate: f64, decimals: u32) -> String {
    format!("{}%", format_number(rate * 100.0, decimals))
}

/// Format a month-over-month change with an explicit sign.
///
/// ```
/// use hr_core::formatting::format_delta;
///
/// assert_eq!(format_delta(3), "+3");
/// assert_eq!(format_delta(-12), "-12");
/// assert_eq!(format_delta(0), "±0");
/// ```
pub fn format_delta(delta: i64) -> String {
    match delta {
        0 => "±0".to_string(),
        d if d > 0 => format!("+{}", d),
        d => d.to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
