use super::escape::escape_applescript;
use super::r#trait::KeystrokeSynthesizer;
use crate::debug_if_enabled;
use crate::error::{BridgeError, Result};
use crate::events::Modifiers;
use crate::services::keycode_map::KeycodeMap;
use crate::utils::process::run_tool;
use smallvec::SmallVec;

const SYSTEM_EVENTS: &str = "tell application \"System Events\" to";

/// Нажатия через `osascript` и System Events (macOS)
pub struct AppleScriptSynthesizer;

impl AppleScriptSynthesizer {
    pub fn new() -> Self {
        Self
    }

    async fn run_script(&self, script: &str) -> Result<()> {
        debug_if_enabled!("Выполняем AppleScript: {}", script);

        let output = run_tool("osascript", &["-e", script]).await?;
        if let Some(diagnostic) = output.diagnostic() {
            debug_if_enabled!("AppleScript вернул ошибку: {}", diagnostic);
            return Err(BridgeError::Synthesis(diagnostic));
        }

        Ok(())
    }
}

pub fn type_script(text: &str) -> String {
    format!("{} keystroke \"{}\"", SYSTEM_EVENTS, escape_applescript(text))
}

pub fn return_script() -> String {
    format!("{} keystroke return", SYSTEM_EVENTS)
}

/// Именованные клавиши уходят как `key code N`, остальные как `keystroke "k"`
pub fn chord_script(key: &str, modifiers: Modifiers) -> String {
    let target = match KeycodeMap::named(key) {
        Some(named) => format!("key code {}", named.mac_key_code),
        None => format!("keystroke \"{}\"", escape_applescript(key)),
    };

    if modifiers.is_empty() {
        return format!("{} {}", SYSTEM_EVENTS, target);
    }

    let downs: SmallVec<[String; 4]> = modifiers
        .names()
        .iter()
        .map(|name| format!("{} down", name))
        .collect();

    format!("{} {} using {{{}}}", SYSTEM_EVENTS, target, downs.join(", "))
}

#[async_trait::async_trait]
impl KeystrokeSynthesizer for AppleScriptSynthesizer {
    async fn type_text(&self, text: &str) -> Result<()> {
        self.run_script(&type_script(text)).await
    }

    async fn press_return(&self) -> Result<()> {
        self.run_script(&return_script()).await
    }

    async fn press_chord(&self, key: &str, modifiers: Modifiers) -> Result<()> {
        self.run_script(&chord_script(key, modifiers)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Разбор строкового литерала так, как это делает AppleScript
    fn interpret_literal(script: &str) -> String {
        let start = script.find("keystroke \"").expect("no string literal") + "keystroke \"".len();
        let mut chars = script[start..].chars();
        let mut result = String::new();
        while let Some(c) = chars.next() {
            match c {
                '"' => return result,
                '\\' => match chars.next() {
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some(other) => result.push(other),
                    None => panic!("dangling escape"),
                },
                other => result.push(other),
            }
        }
        panic!("unterminated literal in {}", script);
    }

    #[test]
    fn test_type_script() {
        assert_eq!(
            type_script("/clear"),
            r#"tell application "System Events" to keystroke "/clear""#
        );
        assert_eq!(return_script(), r#"tell application "System Events" to keystroke return"#);
    }

    #[test]
    fn test_escaping_round_trip() {
        let samples = [
            r#"say "hello""#,
            r"back\slash",
            "tab\there",
            "cr\rhere",
            r#"" & (do shell script "rm -rf ~") & ""#,
            r#"\" end tell"#,
            "emoji ✓ and кириллица",
        ];

        for sample in samples {
            let script = type_script(sample);
            assert_eq!(interpret_literal(&script), sample, "script: {}", script);
            // Литерал заканчивается ровно в конце скрипта
            assert!(script.ends_with('"'));
        }
    }

    #[test]
    fn test_chord_script() {
        let command = Modifiers::from_names(&["command".to_string()]);
        assert_eq!(
            chord_script("k", command),
            r#"tell application "System Events" to keystroke "k" using {command down}"#
        );

        let all = Modifiers::from_names(&["shift".into(), "Option".into(), "control".into(), "command".into()]);
        assert_eq!(
            chord_script("t", all),
            r#"tell application "System Events" to keystroke "t" using {command down, option down, control down, shift down}"#
        );

        assert_eq!(
            chord_script("k", Modifiers::new()),
            r#"tell application "System Events" to keystroke "k""#
        );
    }

    #[test]
    fn test_chord_named_key_uses_key_code() {
        assert_eq!(
            chord_script("return", Modifiers::new()),
            r#"tell application "System Events" to key code 36"#
        );
        let shift = Modifiers::from_names(&["shift".to_string()]);
        assert_eq!(
            chord_script("Tab", shift),
            r#"tell application "System Events" to key code 48 using {shift down}"#
        );
    }

    #[test]
    fn test_case_insensitive_modifiers_same_script() {
        let lower = Modifiers::from_names(&["command".to_string()]);
        let upper = Modifiers::from_names(&["COMMAND".to_string()]);
        assert_eq!(chord_script("k", lower), chord_script("k", upper));

        let banana = Modifiers::from_names(&["banana".to_string()]);
        assert_eq!(chord_script("k", banana), chord_script("k", Modifiers::new()));
    }
}
