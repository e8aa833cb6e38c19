//! XML character rules the document enforces before anything is written.

use std::borrow::Cow;

/// Returns true if every character of `s` is allowed in XML 1.0 content.
pub(crate) fn is_text(s: &str) -> bool {
    s.chars().all(|c| {
        matches!(c,
            '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}')
    })
}

/// Returns true if `s` can be used as an unprefixed element name.
///
/// Accepts a subset of the XML `Name` production: a letter or underscore,
/// then letters, digits, `-`, `_`, or `.`. Colons are refused since the
/// only declared prefix is `viz`.
pub(crate) fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Escapes an attribute value or text node, including whitespace that
/// readers would otherwise normalize.
pub(crate) fn escape_value(value: &str) -> Cow<'_, str> {
    let escaped = quick_xml::escape::escape(value);
    if !escaped.contains(['\t', '\n', '\r']) {
        return escaped;
    }
    Cow::Owned(
        escaped
            .replace('\t', "&#9;")
            .replace('\n', "&#10;")
            .replace('\r', "&#13;"),
    )
}
