use super::r#trait::WindowObserver;
use crate::error::{BridgeError, Result};
use crate::events::FocusObservation;
use std::sync::atomic::{AtomicUsize, Ordering};

type Step = std::result::Result<FocusObservation, String>;

/// Эмуляция активного окна без обращения к ОС.
///
/// В режиме сухого запуска циклически перебирает фейковые окна, задерживаясь
/// на каждом несколько опросов. В тестах проигрывает заданный сценарий,
/// после его окончания повторяет последний шаг.
pub struct DryRunObserver {
    steps: Vec<Step>,
    hold: usize,
    cycle: bool,
    queries: AtomicUsize,
}

impl DryRunObserver {
    pub fn new() -> Self {
        let fake_windows = [
            ("Terminal", "claude - dry_run"),
            ("Google Chrome", "VibeDeck - dry_run"),
            ("Cursor", "main.rs - dry_run"),
            ("Google Chrome", "VibeDeck - dry_run"),
        ];

        Self {
            steps: fake_windows
                .iter()
                .map(|(app, title)| Ok(FocusObservation::new(*app, *title)))
                .collect(),
            hold: 20,
            cycle: true,
            queries: AtomicUsize::new(0),
        }
    }

    #[cfg(test)]
    pub fn scripted(steps: Vec<Step>) -> Self {
        Self {
            steps,
            hold: 1,
            cycle: false,
            queries: AtomicUsize::new(0),
        }
    }

    /// Сколько раз у наблюдателя спрашивали активное окно
    #[cfg(test)]
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WindowObserver for DryRunObserver {
    async fn current_foreground(&self) -> Result<FocusObservation> {
        let query = self.queries.fetch_add(1, Ordering::SeqCst);
        if self.steps.is_empty() {
            return Err(BridgeError::Observation("нет шагов сценария".to_string()));
        }

        let mut index = query / self.hold;
        if self.cycle {
            index %= self.steps.len();
        } else {
            index = index.min(self.steps.len() - 1);
        }

        self.steps[index].clone().map_err(BridgeError::Observation)
    }
}
