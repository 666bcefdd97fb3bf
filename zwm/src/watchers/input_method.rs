use super::{command_output, Source};

/// Asks fcitx5 for the current input method, through `fcitx5-remote`
#[derive(Debug, Default)]
pub(crate) struct InputMethodSource;

impl Source for InputMethodSource {
    type Value = String;

    fn name(&self) -> &'static str {
        "input method"
    }

    fn poll(&mut self) -> Result<String, String> {
        // -n prints the name of the current input method
        command_output("fcitx5-remote", &["-n"]).map(|name| label(&name).to_string())
    }
}

/// A short label for an input method name
fn label(name: &str) -> &str {
    let name = name.trim();
    if name.is_empty() {
        return "-";
    }
    if name.starts_with("keyboard-") {
        return "EN";
    }
    match name {
        "pinyin" | "shuangpin" | "wubi" | "rime" | "chewing" => "中",
        "mozc" | "anthy" | "kkc" => "あ",
        "hangul" => "한",
        // the name is all there is
        other => other.char_indices().nth(2).map_or(other, |(i, _)| &other[..i]),
    }
}

#[cfg(test)]
mod tests {
    use super::label;

    #[test]
    fn labels() {
        assert_eq!(label("keyboard-us"), "EN");
        assert_eq!(label("keyboard-de-nodeadkeys"), "EN");
        assert_eq!(label("pinyin"), "中");
        assert_eq!(label("mozc\n"), "あ");
        assert_eq!(label(""), "-");
        assert_eq!(label("unikey"), "un");
        assert_eq!(label("x"), "x");
    }
}
