//! Keeps response bodies from flooding debug/error logs.

/// Maximum number of bytes of a body kept in a log line.
const LOG_BODY_LIMIT: usize = 512;

/// Largest char boundary `<= index`.
fn char_boundary_at_or_before(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Truncate a body for logging, noting the original size when cut.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_BODY_LIMIT {
        return s.to_string();
    }
    let cut = char_boundary_at_or_before(s, LOG_BODY_LIMIT);
    format!("{}... [{} bytes total]", &s[..cut], s.len())
}
