//! Locale-formatted price parsing (`$1.475,90` -> `1475.90`).

/// Parses an es-AR formatted price.
///
/// Everything except digits, `,`, `.` and `-` is dropped, periods are taken
/// as thousands separators and the first comma as the decimal separator.
/// Absence is always `None`; this never fails.
pub fn parse_price(text: Option<&str>) -> Option<f64> {
    let text = text?;
    if !text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    let normalized = kept.replace('.', "").replacen(',', ".", 1);

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}
