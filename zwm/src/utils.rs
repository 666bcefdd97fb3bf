use std::path::{Path, PathBuf};

use common::{truncate_at_boundary, MAX_TEXT_LEN};

/// Replace a leading `~` with the home directory
pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(std::path::Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(mut home) => {
                home.extend(components);
                home
            }
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Decode the value of a text property, lossily, keeping at most `MAX_TEXT_LEN - 1` bytes
pub(crate) fn text_from_property(value: &[u8]) -> String {
    let value = value.split(|b| *b == 0).next().unwrap_or_default();
    let mut text = String::from_utf8_lossy(value).into_owned();
    truncate_at_boundary(&mut text, MAX_TEXT_LEN - 1);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_properties() {
        assert_eq!(text_from_property(b"hello\0world"), "hello");
        assert_eq!(text_from_property(b""), "");

        let long = "ä".repeat(MAX_TEXT_LEN);
        let text = text_from_property(long.as_bytes());
        assert!(text.len() < MAX_TEXT_LEN);
        assert!(text.chars().all(|c| c == 'ä'));
    }
}
