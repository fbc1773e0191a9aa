//! Arithmetic over possibly-unavailable values.
//!
//! Every helper here is total: a missing operand, a zero denominator or a
//! non-finite result yields `None`.

/// `Some(value)` if finite, else `None`.
pub const fn finite(value: f64) -> Option<f64> {
    if value.is_finite() { Some(value) } else { None }
}

/// `numerator / denominator`, unavailable when either side is missing or the
/// denominator is zero.
pub fn safe_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (numerator, denominator) = (numerator?, denominator?);
    if denominator == 0.0 {
        return None;
    }
    finite(numerator / denominator)
}

/// Scale a fraction to percentage units.
pub fn percent(fraction: Option<f64>) -> Option<f64> {
    fraction.and_then(|f| finite(f * 100.0))
}

/// `a - b`, unavailable when either side is missing.
pub fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    finite(a? - b?)
}

/// Percentage change from `prior` to `current`.
///
/// Divides by the signed prior value, so a move from -50 to -25 is -50%.
pub fn growth(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    percent(safe_div(difference(current, prior), prior))
}
