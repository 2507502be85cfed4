/// Marker appended to truncated display copies.
pub const ELLIPSIS: &str = "...";

/// Shorten `s` to at most `max` characters for display.
///
/// Strings that fit are returned unchanged. Longer ones keep the first
/// `max - 3` characters followed by `...`, so the result is exactly `max`
/// characters long.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let end = s.char_indices().nth(keep).map(|(i, _)| i).unwrap_or(s.len());
    let mut out = String::with_capacity(end + ELLIPSIS.len());
    out.push_str(&s[..end]);
    // Degenerate widths below the marker length still respect `max`.
    out.push_str(&ELLIPSIS[..max.min(ELLIPSIS.len())]);
    out
}

/// Linear-interpolation percentile over pre-sorted values. `p` is 0–100.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let Some(last) = sorted.last() else {
        return 0.0;
    };
    let n = sorted.len();
    let k = (n - 1) as f64 * p / 100.0;
    let f = k.floor() as usize;
    let c = f + 1;
    if c >= n {
        return *last;
    }
    let d = k - f as f64;
    sorted[f] + d * (sorted[c] - sorted[f])
}
