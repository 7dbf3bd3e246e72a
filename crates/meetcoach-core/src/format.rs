//! Plain-text helpers shared by the report and email renderers.

/// Width of the `=` and `-` rules used in reports.
pub const RULE_WIDTH: usize = 80;

/// Returns a rule of `ch` repeated [`RULE_WIDTH`] times.
pub fn rule(ch: char) -> String {
    std::iter::repeat_n(ch, RULE_WIDTH).collect()
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Makes a label safe to embed in a filename.
///
/// Spaces become `_` and path separators become `-`.
pub fn filename_safe(label: &str) -> String {
    label.replace(' ', "_").replace(['/', '\\'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_width() {
        assert_eq!(rule('=').len(), 80);
        assert!(rule('-').chars().all(|c| c == '-'));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn safe_filenames() {
        assert_eq!(filename_safe("Last 7 day(s)"), "Last_7_day(s)");
        assert_eq!(filename_safe("2025/03/01 to 2025/03/05"), "2025-03-01_to_2025-03-05");
    }
}
