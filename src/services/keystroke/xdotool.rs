use super::r#trait::KeystrokeSynthesizer;
use crate::error::{BridgeError, Result};
use crate::events::Modifiers;
use crate::services::keycode_map::KeycodeMap;
use crate::utils::process::run_tool;
use smallvec::SmallVec;
use tracing::debug;

/// Нажатия через xdotool (X11). Текст передаётся отдельным аргументом,
/// экранирование не нужно.
pub struct XdotoolSynthesizer;

impl XdotoolSynthesizer {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        let output = run_tool("xdotool", args).await?;
        if let Some(diagnostic) = output.diagnostic() {
            debug!("xdotool вернул ошибку: {}", diagnostic);
            return Err(BridgeError::Synthesis(diagnostic));
        }
        Ok(())
    }
}

fn modifier_keysym(name: &str) -> &'static str {
    match name {
        "command" => "super",
        "option" => "alt",
        "control" => "ctrl",
        _ => "shift",
    }
}

/// Аккорд в нотации `xdotool key`, например `super+shift+k`
pub fn chord_arg(key: &str, modifiers: Modifiers) -> String {
    let key = match KeycodeMap::named(key) {
        Some(named) => named.x_keysym.to_string(),
        None => key.to_string(),
    };

    let mut parts: SmallVec<[String; 5]> = modifiers
        .names()
        .iter()
        .map(|name| modifier_keysym(name).to_string())
        .collect();
    parts.push(key);
    parts.join("+")
}

#[async_trait::async_trait]
impl KeystrokeSynthesizer for XdotoolSynthesizer {
    async fn type_text(&self, text: &str) -> Result<()> {
        self.run(&["type", "--clearmodifiers", "--", text]).await
    }

    async fn press_return(&self) -> Result<()> {
        self.run(&["key", "--clearmodifiers", "Return"]).await
    }

    async fn press_chord(&self, key: &str, modifiers: Modifiers) -> Result<()> {
        let chord = chord_arg(key, modifiers);
        self.run(&["key", "--clearmodifiers", &chord]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_arg() {
        let command = Modifiers::from_names(&["Command".to_string()]);
        assert_eq!(chord_arg("k", command), "super+k");

        let mods = Modifiers::from_names(&["shift".into(), "control".into(), "option".into()]);
        assert_eq!(chord_arg("t", mods), "alt+ctrl+shift+t");

        assert_eq!(chord_arg("escape", Modifiers::new()), "Escape");
        assert_eq!(chord_arg("f5", Modifiers::new()), "F5");
    }
}
