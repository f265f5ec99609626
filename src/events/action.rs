use crate::error::ActionError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Запрос действия в том виде, в котором его присылает панель.
///
/// Все поля необязательные: отсутствие нужного поля - это ошибка валидации
/// в ответе, а не ошибка разбора сообщения.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ActionRequest {
    #[cfg(test)]
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn model(model: &str) -> Self {
        Self { model: Some(model.to_string()), ..Self::new("model") }
    }

    #[cfg(test)]
    pub fn slash(command: &str) -> Self {
        Self { command: Some(command.to_string()), ..Self::new("slash") }
    }

    #[cfg(test)]
    pub fn keystroke(text: &str) -> Self {
        Self { text: Some(text.to_string()), ..Self::new("keystroke") }
    }

    #[cfg(test)]
    pub fn combo(key: &str, modifiers: &[&str]) -> Self {
        Self {
            key: Some(key.to_string()),
            modifiers: Some(modifiers.iter().map(|m| m.to_string()).collect()),
            ..Self::new("combo")
        }
    }

    #[cfg(test)]
    pub fn permission(response: &str) -> Self {
        Self { response: Some(response.to_string()), ..Self::new("permission") }
    }

    /// Проверить тип и обязательные поля, получить типизированное действие
    pub fn validate(&self) -> Result<Action, ActionError> {
        match self.kind.as_str() {
            "model" => Ok(Action::Model {
                model: required(&self.model, "model")?,
            }),
            "slash" => Ok(Action::Slash {
                command: required(&self.command, "command")?,
            }),
            "keystroke" => Ok(Action::Keystroke {
                text: required(&self.text, "text")?,
            }),
            "combo" => Ok(Action::Combo {
                key: required(&self.key, "key")?,
                modifiers: Modifiers::from_names(self.modifiers.as_deref().unwrap_or_default()),
            }),
            "permission" => Ok(Action::Permission {
                response: required(&self.response, "response")?,
            }),
            other => Err(ActionError::UnknownType(other.to_string())),
        }
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, ActionError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ActionError::MissingField(field)),
    }
}

/// Проверенное действие
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Model { model: String },
    Slash { command: String },
    Keystroke { text: String },
    Combo { key: String, modifiers: Modifiers },
    Permission { response: String },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Model { model } => write!(f, "model({})", model),
            Action::Slash { command } => write!(f, "slash({})", command),
            Action::Keystroke { text } => write!(f, "keystroke({} симв.)", text.chars().count()),
            Action::Combo { key, modifiers } => write!(f, "combo({}+{})", modifiers, key),
            Action::Permission { response } => write!(f, "permission({})", response),
        }
    }
}

/// Результат выполнения действия: `error` есть тогда и только тогда,
/// когда `success == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

impl From<Result<(), ActionError>> for ActionResult {
    fn from(result: Result<(), ActionError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Модификаторы аккорда
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub command: bool,
    pub option: bool,
    pub control: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_command(mut self, command: bool) -> Self {
        self.command = command;
        self
    }

    #[cfg(test)]
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.command && !self.option && !self.control && !self.shift
    }

    /// Имена модификаторов в каноническом порядке
    pub fn names(&self) -> SmallVec<[&'static str; 4]> {
        let mut result = SmallVec::new();
        if self.command { result.push("command"); }
        if self.option { result.push("option"); }
        if self.control { result.push("control"); }
        if self.shift { result.push("shift"); }
        result
    }

    /// Регистр не важен, неизвестные имена молча отбрасываются
    pub fn from_names(names: &[String]) -> Self {
        let mut result = Self::new();
        for name in names {
            match name.to_lowercase().as_str() {
                "command" => result.command = true,
                "option" => result.option = true,
                "control" => result.control = true,
                "shift" => result.shift = true,
                _ => {}
            }
        }
        result
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}
