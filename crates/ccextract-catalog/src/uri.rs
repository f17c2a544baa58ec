//! Splitting of `scheme:body?query#fragment` strings.

/// Split a leading `scheme:` off `s`.
///
/// A scheme starts with an ASCII letter, continues with letters, digits,
/// `+`, `-` or `.`, and is at least two characters long so a drive letter
/// such as `C:` stays part of the path.
pub fn split_scheme(s: &str) -> (Option<&str>, &str) {
    match s.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => (Some(scheme), rest),
        _ => (None, s),
    }
}

/// Split a trailing selector off `s`. The selector starts at the first `?`,
/// or at the first `#` when there is no `?`, and keeps its marker.
pub fn split_selector(s: &str) -> (&str, Option<&str>) {
    match s.find('?').or_else(|| s.find('#')) {
        Some(at) => (&s[..at], Some(&s[at..])),
        None => (s, None),
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    candidate.len() >= 2 && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
