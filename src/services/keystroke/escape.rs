/// Экранирование текста для строкового литерала AppleScript.
///
/// Обратный слеш обрабатывается первым, поэтому уже экранированные
/// последовательности не экранируются повторно.
pub fn escape_applescript(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(escape_applescript("/model opus"), "/model opus");
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(escape_applescript(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_applescript(r"C:\tmp"), r"C:\\tmp");
        assert_eq!(escape_applescript("a\tb\r"), r"a\tb\r");
        assert_eq!(escape_applescript("a\nb"), r"a\nb");
    }

    #[test]
    fn test_backslash_first_no_double_escape() {
        // Литеральные символы "\" и "n" остаются двумя символами
        assert_eq!(escape_applescript(r"\n"), r"\\n");
        assert_eq!(escape_applescript(r#"\""#), r#"\\\""#);
    }
}
