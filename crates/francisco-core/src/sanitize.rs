use once_cell::sync::Lazy;
use regex::Regex;

static MARKDOWN_ARTIFACTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[*#]+").expect("static pattern compiles"));

/// Remove every run of `*` or `#` left over from Markdown emphasis and
/// headings. Everything else, including `<b>` tags, is kept as-is.
pub fn strip_markdown(text: &str) -> String {
    MARKDOWN_ARTIFACTS.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_headings_and_emphasis() {
        let raw = "### Plan\n**Lundi** : course 🏃\n# Fin";
        assert_eq!(strip_markdown(raw), " Plan\nLundi : course 🏃\n Fin");
    }

    #[test]
    fn test_keeps_bold_tags_and_plain_text() {
        let raw = "<b>Budget mensuel 💰\nÉpargnez 10 %.";
        assert_eq!(strip_markdown(raw), raw);
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert_eq!(strip_markdown(""), "");
        assert_eq!(strip_markdown("*#*##"), "");
    }
}
