//! Numbers out of free-text card fields.
//!
//! Every function here is total: text that does not contain the expected
//! number yields zero or `None`, never an error.

use std::sync::OnceLock;

use regex::Regex;

fn dollar_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\s*(\d[\d,]*(?:\.\d+)?)").expect("valid regex"))
}

fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))").expect("valid regex"))
}

/// First dollar amount in `text`, e.g. `"$95 after intro year"` -> 95.0.
/// Text without a `$<digits>` group is a zero fee.
pub fn dollar_amount(text: &str) -> f64 {
    dollar_re()
        .captures(text)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
        .unwrap_or(0.0)
}

/// Leading decimal number of `text`, the way a browser's `parseFloat` reads
/// it: `"19.74% - 28.49% Variable"` -> 19.74, `"0% Intro APR"` -> 0.0,
/// `"N/A"` -> `None`.
pub fn leading_number(text: &str) -> Option<f64> {
    leading_number_re()
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Leading number of an APR description; blank text reads as `default`.
pub fn apr_value(text: &str, default: f64) -> Option<f64> {
    if text.trim().is_empty() {
        return Some(default);
    }
    leading_number(text)
}

/// Non-negative spend amount from user input. Anything else is zero.
pub fn spend_amount(raw: &str) -> f64 {
    let s = raw.trim().replace(',', "");
    let s = s.strip_prefix('$').unwrap_or(&s);
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}
