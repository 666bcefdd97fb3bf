//! Things shared between zwm and zwmc
mod errors;
mod panel;

pub use errors::*;
pub use panel::Panel;

/// Name of the root window property zwm reads the status (logo) text from
pub const STATUS_PROPERTY: &str = "WM_NAME";

/// Name of the property zwm writes to its supporting window
pub const WM_NAME: &str = "zwm";

/// How many extra text panels can be set through root window properties
pub const PANEL_COUNT: usize = 3;

/// Longest text (in bytes) zwm keeps from any text property
pub const MAX_TEXT_LEN: usize = 256;

/// Shorten `text` to at most `max` bytes without splitting a character
pub fn truncate_at_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_whole_characters() {
        let mut text = String::from("aé中");
        truncate_at_boundary(&mut text, 4);
        assert_eq!(text, "aé");

        let mut text = String::from("中中");
        truncate_at_boundary(&mut text, 5);
        assert_eq!(text, "中");

        let mut text = String::from("short");
        truncate_at_boundary(&mut text, MAX_TEXT_LEN - 1);
        assert_eq!(text, "short");
    }
}
