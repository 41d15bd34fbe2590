use std::sync::LazyLock;

use regex::Regex;

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[/?(ch|tab)\]").unwrap());

/// `\r\n` and lone `\r` become `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Remove `[ch]`, `[/ch]`, `[tab]` and `[/tab]` tokens.
///
/// Repeats until nothing matches, so tokens that only appear once an inner
/// one is gone (`[[ch]ch]`) are removed too and `strip(strip(x)) == strip(x)`.
pub fn strip_markup(text: &str) -> String {
    let mut out = text.to_string();
    while MARKUP_RE.is_match(&out) {
        out = MARKUP_RE.replace_all(&out, "").into_owned();
    }
    out
}
