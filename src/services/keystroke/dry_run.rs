use super::r#trait::KeystrokeSynthesizer;
use crate::error::Result;
use crate::events::Modifiers;
use parking_lot::Mutex;
use tracing::info;

/// Одна операция синтеза, как её увидел бы хост
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthCall {
    Type(String),
    Return,
    Chord { key: String, modifiers: Modifiers },
}

/// Режим сухого запуска: ничего не нажимает, только пишет в лог.
/// В режиме записи дополнительно запоминает все вызовы.
pub struct DryRunSynthesizer {
    recorded: Option<Mutex<Vec<SynthCall>>>,
}

impl DryRunSynthesizer {
    pub fn new() -> Self {
        Self { recorded: None }
    }

    #[cfg(test)]
    pub fn recording() -> Self {
        Self {
            recorded: Some(Mutex::new(Vec::new())),
        }
    }

    #[cfg(test)]
    pub fn calls(&self) -> Vec<SynthCall> {
        self.recorded
            .as_ref()
            .map(|calls| calls.lock().clone())
            .unwrap_or_default()
    }

    fn record(&self, call: SynthCall) {
        info!("[DRY RUN] {:?}", call);
        if let Some(calls) = &self.recorded {
            calls.lock().push(call);
        }
    }
}

#[async_trait::async_trait]
impl KeystrokeSynthesizer for DryRunSynthesizer {
    async fn type_text(&self, text: &str) -> Result<()> {
        self.record(SynthCall::Type(text.to_string()));
        Ok(())
    }

    async fn press_return(&self) -> Result<()> {
        self.record(SynthCall::Return);
        Ok(())
    }

    async fn press_chord(&self, key: &str, modifiers: Modifiers) -> Result<()> {
        self.record(SynthCall::Chord {
            key: key.to_string(),
            modifiers,
        });
        Ok(())
    }
}
