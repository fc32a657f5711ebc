use std::sync::LazyLock;

use regex::Regex;

/// Entities decoded by [`clean_text`]. Anything else is left as-is.
const ENTITIES: &[(&str, &str)] = &[
    ("&#x200B;", ""),
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

static NEWLINE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").expect("valid regex"));

/// Normalize free text for export: decode the handful of HTML entities Reddit
/// escapes, collapse newline runs, trim.
///
/// Decoding repeats until nothing is left to decode, so the result is stable
/// under a second application.
pub fn clean_text(text: &str) -> String {
    let mut decoded = text.to_string();
    loop {
        let next = ENTITIES
            .iter()
            .fold(decoded.clone(), |acc, &(entity, replacement)| {
                acc.replace(entity, replacement)
            });
        if next == decoded {
            break;
        }
        decoded = next;
    }

    NEWLINE_RUN_RE
        .replace_all(&decoded, "\n")
        .trim()
        .to_string()
}

/// [`clean_text`] with an explicit sentinel for absent fields.
pub fn clean_optional(text: Option<&str>) -> String {
    clean_text(text.unwrap_or(crate::types::NOT_AVAILABLE))
}
