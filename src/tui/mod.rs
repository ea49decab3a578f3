pub mod detail;
pub mod footer;
pub mod header;
pub mod render;
pub mod tree;

use ratatui::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::Status;

pub fn status_icon(status: Option<Status>) -> (&'static str, Color) {
    match status {
        Some(Status::Passed) => ("✓", Color::Green),
        Some(Status::Failed) => ("✗", Color::Red),
        Some(Status::Skipped) => ("⊘", Color::Yellow),
        None => ("·", Color::DarkGray),
    }
}

/// Cut `s` to `max_width` display columns, ending in `…` when shortened.
pub fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut result = String::new();
    let mut width = 0;
    for c in s.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + cw + 1 > max_width {
            result.push('…');
            break;
        }
        result.push(c);
        width += cw;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_unchanged() {
        assert_eq!(truncate("login", 10), "login");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("LoginTest.testValid", 8), "LoginTe…");
    }

    #[test]
    fn truncate_zero_width() {
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn truncate_wide_chars() {
        // each CJK char is two columns
        assert_eq!(truncate("テスト結果", 5), "テス…");
    }
}
