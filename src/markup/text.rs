//! Text transforms applied before markup emission.

use std::sync::LazyLock;

use regex::Regex;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.,/#!$%\^&*;:{}=\-_`~()]").expect("punctuation pattern is valid")
});

static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));

/// Optional uppercase and punctuation stripping, applied in that order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextTransform {
    pub uppercase: bool,
    pub strip_punctuation: bool,
}

impl TextTransform {
    pub fn apply(&self, text: &str) -> String {
        let mut out = if self.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        };

        if self.strip_punctuation {
            out = PUNCTUATION.replace_all(&out, "").into_owned();
            out = MULTI_SPACE.replace_all(&out, " ").into_owned();
        }

        out
    }
}

/// Make user text safe inside a dialogue line. Braces open override blocks
/// and a backslash would start an escape sequence.
pub fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\u{29F5}")
        .replace('{', "(")
        .replace('}', ")")
        .replace('\n', " ")
}
