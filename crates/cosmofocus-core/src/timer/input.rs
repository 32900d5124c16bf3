//! Parsing of the free-text duration field.
//!
//! Accepts `"M"` (minutes) or `"M:S"`. Garbage degrades to zero instead of
//! failing, and each component is read the lenient way a text box is:
//! leading sign and digits count, the rest is ignored (`"1.5"` is one
//! minute, `"abc"` is nothing).

/// Leading integer of `s`, if any.
///
/// Skips leading whitespace, accepts one `+`/`-`, then as many ASCII digits
/// as follow. Saturates instead of overflowing.
pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let magnitude = digits[..len].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Minutes the user asked for, as the achievement rules see them.
pub fn requested_minutes(input: &str) -> Option<i64> {
    leading_int(input)
}

/// Convert duration text to whole seconds. Never fails; negatives become 0.
pub fn parse_duration(input: &str) -> u64 {
    let secs = match input.split_once(':') {
        Some((min, sec)) => {
            let min = leading_int(min).unwrap_or(0);
            let sec = leading_int(sec).unwrap_or(0);
            min.saturating_mul(60).saturating_add(sec)
        }
        None => leading_int(input).unwrap_or(0).saturating_mul(60),
    };
    u64::try_from(secs).unwrap_or(0)
}

/// Render seconds as `M:SS`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
