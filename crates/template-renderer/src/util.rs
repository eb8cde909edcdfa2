//! Small text helpers shared by the renderers and extensions.

/// Path separator characters stripped from template names and root paths.
pub const PATH_SEPARATORS: &[char] = &['/', '\\'];

/// Whether `name` can be bound as a variable in a file template.
///
/// Accepts a leading ASCII letter or underscore followed by ASCII letters,
/// digits or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strips leading and trailing path separators.
pub fn trim_separators(s: &str) -> &str {
    s.trim_matches(PATH_SEPARATORS)
}

/// Truncates a string to fit within a maximum display width, adding an
/// ellipsis if needed.
///
/// Uses Unicode width calculations, so wide characters count for two
/// columns.
///
/// ```rust
/// use template_renderer::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Hello", 10), "Hello");
/// assert_eq!(truncate_to_width("Hello World", 6), "Hello…");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    // Reserve 1 column for the ellipsis
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }

    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("name"));
        assert!(is_identifier("_x"));
        assert!(is_identifier("user_2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2user"));
        assert!(!is_identifier("user.name"));
        assert!(!is_identifier("ünïcode"));
    }

    #[test]
    fn test_trim_separators() {
        assert_eq!(trim_separators("/foo/bar/"), "foo/bar");
        assert_eq!(trim_separators("\\foo\\"), "foo");
        assert_eq!(trim_separators("//"), "");
        assert_eq!(trim_separators("a/b"), "a/b");
    }

    #[test]
    fn test_truncate_to_width_no_truncation() {
        assert_eq!(truncate_to_width("Hello", 5), "Hello");
    }

    #[test]
    fn test_truncate_to_width_with_truncation() {
        assert_eq!(truncate_to_width("Hello World", 7), "Hello …");
        assert_eq!(truncate_to_width("123456", 5), "1234…");
    }

    #[test]
    fn test_truncate_to_width_zero_width() {
        assert_eq!(truncate_to_width("Hello", 0), "…");
    }

    #[test]
    fn test_truncate_to_width_wide_chars() {
        // each CJK character is two columns wide
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
    }
}
