//! String helpers shared by the front-ends.

/// Shorten `s` to at most `max_len` bytes, ending in `...` when cut
///
/// The cut always lands on a UTF-8 character boundary.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let mut end = max_len.saturating_sub(3);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
