use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub focus: FocusConfig,
    pub shutdown: ShutdownConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
}

/// Чем синтезировать нажатия и опрашивать активное окно
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
pub enum BackendKind {
    #[serde(rename = "auto")]
    #[value(name = "auto")]
    Auto,
    #[serde(rename = "applescript")]
    #[value(name = "applescript")]
    AppleScript,
    #[serde(rename = "xdotool")]
    #[value(name = "xdotool")]
    Xdotool,
    #[serde(rename = "dry_run")]
    #[value(name = "dry_run")]
    DryRun,
}

impl BackendKind {
    /// `Auto` превращается в конкретный бэкенд текущей ОС
    pub fn resolve(self) -> Self {
        match self {
            BackendKind::Auto if cfg!(target_os = "macos") => BackendKind::AppleScript,
            BackendKind::Auto => BackendKind::Xdotool,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FocusConfig {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    pub max_consecutive_errors: u32,
    pub browser_apps: Vec<String>,
    pub self_markers: Vec<String>,
    pub product_name: String,
    // Нормализованные паттерны - не сериализуются, строятся после загрузки
    #[serde(skip)]
    browser_apps_lower: Vec<String>,
    #[serde(skip)]
    self_markers_lower: Vec<String>,
}

impl FocusConfig {
    pub fn browser_patterns(&self) -> &[String] {
        &self.browser_apps_lower
    }

    pub fn self_patterns(&self) -> &[String] {
        &self.self_markers_lower
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShutdownConfig {
    pub grace_period_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            server: ServerConfig {
                bind: "127.0.0.1:5501".to_string(),
            },
            backend: BackendConfig {
                kind: BackendKind::Auto,
            },
            focus: FocusConfig {
                enabled: true,
                poll_interval_ms: 500,
                max_consecutive_errors: 3,
                browser_apps: ["chrome", "safari", "firefox", "edge", "brave"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                self_markers: ["vibedeck", "localhost:5500", "127.0.0.1:5500"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                product_name: "VibeDeck".to_string(),
                browser_apps_lower: Vec::new(),
                self_markers_lower: Vec::new(),
            },
            shutdown: ShutdownConfig {
                grace_period_ms: 3000,
            },
        };
        config.build_pattern_indexes();
        config
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("VIBEDECK_").split("__"));

        let mut config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;
        config.build_pattern_indexes();

        Ok(config)
    }

    /// Приводит паттерны распознавания панели к нижнему регистру
    pub fn build_pattern_indexes(&mut self) {
        self.focus.browser_apps_lower = self
            .focus
            .browser_apps
            .iter()
            .map(|pattern| pattern.to_lowercase())
            .collect();

        self.focus.self_markers_lower = self
            .focus
            .self_markers
            .iter()
            .map(|pattern| pattern.to_lowercase())
            .collect();
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("Неверный адрес сервера: {}", self.server.bind);
        }

        if self.focus.poll_interval_ms < 100 {
            anyhow::bail!("poll_interval_ms должно быть минимум 100");
        }

        if self.focus.max_consecutive_errors == 0 {
            anyhow::bail!("max_consecutive_errors должно быть больше 0");
        }

        if self.focus.browser_apps.iter().any(|p| p.trim().is_empty())
            || self.focus.self_markers.iter().any(|p| p.trim().is_empty())
        {
            anyhow::bail!("Пустой паттерн в browser_apps или self_markers");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.focus.poll_interval_ms, 500);
        assert_eq!(config.focus.max_consecutive_errors, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.focus.poll_interval_ms = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.focus.max_consecutive_errors = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.bind = "not an address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_patterns_are_lowercased() {
        let mut config = Config::default();
        config.focus.self_markers = vec!["MyDeck".to_string()];
        config.build_pattern_indexes();
        assert_eq!(config.focus.self_patterns(), &["mydeck".to_string()]);
    }

    #[test]
    fn test_load_merges_file_over_defaults() {
        let path = std::env::temp_dir().join(format!("vibedeck-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            "[focus]\npoll_interval_ms = 750\nbrowser_apps = [\"Arc\"]\n\n[backend]\nkind = \"dry_run\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.focus.poll_interval_ms, 750);
        assert_eq!(config.focus.max_consecutive_errors, 3);
        assert_eq!(config.focus.browser_patterns(), &["arc".to_string()]);
        assert_eq!(config.backend.kind, BackendKind::DryRun);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/vibedeck.toml").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:5501");
    }

    #[test]
    fn test_auto_backend_resolves() {
        assert_ne!(BackendKind::Auto.resolve(), BackendKind::Auto);
        assert_eq!(BackendKind::DryRun.resolve(), BackendKind::DryRun);
    }
}
