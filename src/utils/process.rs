use crate::bridge_error;
use crate::debug_if_enabled;
use crate::error::Result;
use std::io::ErrorKind;
use std::process::ExitStatus;
use tokio::process::Command;

/// Вывод внешней утилиты (osascript, xdotool)
#[derive(Debug)]
pub struct ToolOutput {
    pub program: &'static str,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Диагностика, если вызов нельзя считать успешным: непустой stderr
    /// или ненулевой код возврата.
    pub fn diagnostic(&self) -> Option<String> {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return Some(stderr.to_string());
        }
        if !self.status.success() {
            return Some(format!("{} exited with {}", self.program, self.status));
        }
        None
    }
}

/// Запустить утилиту напрямую, без shell: аргументы передаются как есть
pub async fn run_tool(program: &'static str, args: &[&str]) -> Result<ToolOutput> {
    debug_if_enabled!("Запуск {} {:?}", program, args);

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => bridge_error!(tool_not_found, "{}", program),
            _ => e.into(),
        })?;

    Ok(ToolOutput {
        program,
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Есть ли исполняемый файл в PATH
pub fn is_in_path(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;

    #[tokio::test]
    async fn missing_tool_is_reported_by_name() {
        let err = run_tool("vibedeck-definitely-missing-tool", &[]).await.unwrap_err();
        assert!(matches!(err, BridgeError::ToolNotFound(name) if name == "vibedeck-definitely-missing-tool"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_output_is_a_diagnostic() {
        let output = run_tool("sh", &["-c", "echo oops >&2"]).await.unwrap();
        assert_eq!(output.diagnostic().as_deref(), Some("oops"));

        let output = run_tool("sh", &["-c", "exit 3"]).await.unwrap();
        assert!(output.diagnostic().unwrap().starts_with("sh exited with"));

        let output = run_tool("sh", &["-c", "echo fine"]).await.unwrap();
        assert!(output.diagnostic().is_none());
        assert_eq!(output.stdout.trim(), "fine");
    }
}
