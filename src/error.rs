use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка разбора сообщения: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Утилита не найдена: {0}")]
    ToolNotFound(String),

    /// Скрипт автоматизации завершился с ошибкой или что-то написал в stderr.
    /// Текст диагностики уходит в ActionResult как есть.
    #[error("{0}")]
    Synthesis(String),

    #[error("Не удалось определить активное окно: {0}")]
    Observation(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Ошибки выполнения действия. Display совпадает с текстом поля `error`
/// в ответе панели.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("{0} not specified")]
    MissingField(&'static str),

    #[error("Unknown action type: {0}")]
    UnknownType(String),

    #[error("{0}")]
    Execution(String),
}

impl From<BridgeError> for ActionError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Synthesis(diagnostic) => ActionError::Execution(diagnostic),
            other => ActionError::Execution(other.to_string()),
        }
    }
}

#[macro_export]
macro_rules! bridge_error {
    (synthesis, $($arg:tt)*) => {
        $crate::error::BridgeError::Synthesis(format!($($arg)*))
    };
    (observation, $($arg:tt)*) => {
        $crate::error::BridgeError::Observation(format!($($arg)*))
    };
    (tool_not_found, $($arg:tt)*) => {
        $crate::error::BridgeError::ToolNotFound(format!($($arg)*))
    };
}
