use crate::models::RewardType;

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let sign = if val < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${}.{dec_part}", group_thousands(int_part))
}

/// Whole points or miles with separators: 60,000
pub fn points(val: f64) -> String {
    let rounded = format!("{:.0}", val.abs());
    let sign = if val < 0.0 && rounded != "0" { "-" } else { "" };
    format!("{sign}{}", group_thousands(&rounded))
}

/// Earn rate as shown next to a bucket: "3%" for cash back, "3x" otherwise.
pub fn rate(rate: f64, earned_as: RewardType) -> String {
    let num = if rate.fract() == 0.0 {
        format!("{rate:.0}")
    } else {
        format!("{rate}")
    };
    if earned_as.is_points() {
        format!("{num}x")
    } else {
        format!("{num}%")
    }
}
