//! URL extraction over the flattened buffer (§4.9).
//!
//! The regex is the one the original implementation credits to
//! <http://blog.mattheworiordan.com/post/13174566389/url-regular-expression-for-links-with-or-without-the>,
//! translated verbatim into `regex` crate syntax (it uses no backreferences
//! or lookaround, so the translation is direct).

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (
            (
                ([A-Za-z]{3,9}:(?:/{2})?)
                (?:[\-;:&=+$,\w]+@)?
                [A-Za-z0-9.\-]+
                |
                (?:www\.|[\-;:&=+$,\w]+@)
                [A-Za-z0-9.\-]+
            )
            (
                (?:/[+~%/.\w\-]*)?
                \??(?:[\-+=&;%@.\w]*)
                \#?(?:[.!/\\\w]*)
            )?
        )
        ",
    )
    .expect("URL regex is a compile-time constant")
});

/// Scan `text` (the flattened backscroll+screen buffer, §4.9) for URLs,
/// returning each distinct match in order of first occurrence.
#[must_use]
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for m in URL_RE.find_iter(text) {
        let word = m.as_str().to_string();
        if seen.insert(word.clone()) {
            out.push(word);
        }
    }
    out
}
