//! Helpers for putting user-supplied strings (item names, replies) into log lines.

use std::fmt::Write;

/// Longest preview kept by [`escape_log`].
pub const MAX_PREVIEW: usize = 120;

/// Escape control characters so a value stays on one log line, truncating at [`MAX_PREVIEW`] chars.
pub fn escape_log(s: &str) -> String {
    escape_log_with_limit(s, MAX_PREVIEW)
}

/// Same as [`escape_log`] with an explicit character limit; truncation is marked with `…`.
pub fn escape_log_with_limit(s: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(s.len().min(max_chars) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count >= max_chars {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:04x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_emoji_and_escapes_breaks() {
        assert_eq!(escape_log("🥕 Carrot\nSeed"), "🥕 Carrot\\nSeed");
        assert_eq!(escape_log("a\u{7}b"), "a\\u{0007}b");
    }

    #[test]
    fn truncates_long_values() {
        assert_eq!(escape_log_with_limit("abcdef", 3), "abc…");
        assert_eq!(escape_log_with_limit("abc", 3), "abc");
    }
}
