use crate::config::FocusConfig;
use crate::debug_if_enabled;
use crate::error::BridgeError;
use crate::events::{FocusNotification, FocusObservation, Notification, SystemMessage};
use crate::services::window_observer::WindowObserver;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Параметры опроса фокуса
#[derive(Debug, Clone)]
pub struct FocusSettings {
    pub poll_interval: Duration,
    pub max_consecutive_errors: u32,
    /// Паттерны в нижнем регистре
    pub browser_apps: Vec<String>,
    /// Паттерны в нижнем регистре
    pub self_markers: Vec<String>,
    pub product_name: String,
}

impl FocusSettings {
    pub fn from_config(config: &FocusConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_consecutive_errors: config.max_consecutive_errors,
            browser_apps: config.browser_patterns().to_vec(),
            self_markers: config.self_patterns().to_vec(),
            product_name: config.product_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Idle,
    Polling,
}

/// Итог одного тика опроса
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Опрос остановлен, ОС не опрашивалась
    Idle,
    /// То же приложение и тот же заголовок
    Unchanged,
    Notified(FocusNotification),
    Failed { consecutive: u32 },
    /// Достигнут порог ошибок, опрос остановлен
    Disabled,
}

/// Снимок липкой цели только для чтения. Пишет в него только FocusTracker.
#[derive(Debug, Clone, Default)]
pub struct TargetHandle(Arc<RwLock<Option<String>>>);

impl TargetHandle {
    pub fn current_target(&self) -> Option<String> {
        self.0.read().clone()
    }

    fn set(&self, target: Option<String>) {
        *self.0.write() = target;
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    last_app: Option<String>,
    last_title: Option<String>,
    consecutive_errors: u32,
}

/// Отслеживает активное приложение и сообщает панели, куда уйдут нажатия.
///
/// Окно самой панели никогда не становится целью: пока оно в фокусе,
/// панель продолжает показывать последнее "настоящее" приложение.
pub struct FocusTracker {
    observer: Arc<dyn WindowObserver>,
    notifier: broadcast::Sender<Notification>,
    settings: FocusSettings,
    status: PollStatus,
    state: TrackerState,
    target: TargetHandle,
}

impl FocusTracker {
    pub fn new(
        observer: Arc<dyn WindowObserver>,
        notifier: broadcast::Sender<Notification>,
        settings: FocusSettings,
    ) -> Self {
        Self {
            observer,
            notifier,
            settings,
            status: PollStatus::Idle,
            state: TrackerState::default(),
            target: TargetHandle::default(),
        }
    }

    pub fn target_handle(&self) -> TargetHandle {
        self.target.clone()
    }

    #[allow(dead_code)]
    pub fn current_target(&self) -> Option<String> {
        self.target.current_target()
    }

    #[allow(dead_code)]
    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn start(&mut self) {
        if self.status == PollStatus::Polling {
            warn!("Отслеживание фокуса уже запущено");
            return;
        }

        info!(
            "Запуск отслеживания фокуса (опрос каждые {}мс)",
            self.settings.poll_interval.as_millis()
        );
        self.state = TrackerState::default();
        self.status = PollStatus::Polling;
    }

    pub fn stop(&mut self) {
        if self.status == PollStatus::Idle {
            return;
        }

        info!("Остановка отслеживания фокуса");
        self.status = PollStatus::Idle;
        self.state = TrackerState::default();
        self.target.set(None);
    }

    /// Запустить цикл опроса до отмены или автоотключения.
    /// Следующий тик начинается только после завершения предыдущего.
    pub async fn run(mut self, cancel: CancellationToken) {
        self.start();

        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.stop();
                    break;
                }
                _ = ticker.tick() => {
                    if matches!(self.tick().await, TickOutcome::Disabled | TickOutcome::Idle) {
                        break;
                    }
                }
            }
        }

        info!("FocusTracker завершил работу");
    }

    /// Один тик опроса
    pub async fn tick(&mut self) -> TickOutcome {
        if self.status == PollStatus::Idle {
            return TickOutcome::Idle;
        }

        match self.observer.current_foreground().await {
            Ok(observation) => {
                self.state.consecutive_errors = 0;
                self.observe(observation)
            }
            Err(e) => self.record_failure(e),
        }
    }

    fn observe(&mut self, observation: FocusObservation) -> TickOutcome {
        let unchanged = self.state.last_app.as_deref() == Some(observation.app_name.as_str())
            && self.state.last_title.as_deref() == Some(observation.window_title.as_str());
        if unchanged {
            return TickOutcome::Unchanged;
        }

        let is_self =
            observation.is_control_surface(&self.settings.browser_apps, &self.settings.self_markers);
        if !is_self {
            self.target.set(Some(observation.app_name.clone()));
        }

        let sticky = self.target.current_target();
        let title = match (&sticky, is_self) {
            (Some(target), true) => {
                format!("({} active, target: {})", self.settings.product_name, target)
            }
            _ => observation.window_title.clone(),
        };

        info!(
            "Фокус: {} {} | цель: {}",
            observation,
            if is_self { "(панель, цель сохраняется)" } else { "(новая цель)" },
            sticky.as_deref().unwrap_or("нет")
        );

        let notification = FocusNotification {
            app: sticky.clone().unwrap_or_else(|| observation.app_name.clone()),
            title,
            connected: sticky.is_some(),
        };
        self.emit(Notification::WindowFocus(notification.clone()));

        self.state.last_app = Some(observation.app_name);
        self.state.last_title = Some(observation.window_title);

        TickOutcome::Notified(notification)
    }

    fn record_failure(&mut self, err: BridgeError) -> TickOutcome {
        self.state.consecutive_errors += 1;
        let consecutive = self.state.consecutive_errors;
        let max = self.settings.max_consecutive_errors;

        if consecutive == 1 {
            warn!("Не удалось определить активное окно (вероятно, нет разрешения Accessibility / Screen Recording): {}", err);
            warn!("Отслеживание фокуса будет отключено после {} ошибок подряд", max);
        } else {
            debug_if_enabled!("Ошибка определения окна #{}: {}", consecutive, err);
        }

        if consecutive >= max {
            error!(
                "Определение окна не удалось {} раз подряд. Отслеживание фокуса отключено, действия продолжают работать",
                consecutive
            );
            self.emit(Notification::System(SystemMessage::error(format!(
                "Window focus detection disabled after {} consecutive failures. Actions still work, but the active window is no longer tracked.",
                consecutive
            ))));
            self.stop();
            return TickOutcome::Disabled;
        }

        TickOutcome::Failed { consecutive }
    }

    fn emit(&self, notification: Notification) {
        notification.publish(&self.notifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::window_observer::DryRunObserver;
    use tokio::sync::broadcast::Receiver;

    fn settings() -> FocusSettings {
        FocusSettings::from_config(&Config::default().focus)
    }

    fn started_tracker(steps: Vec<Result<FocusObservation, String>>) -> (FocusTracker, Arc<DryRunObserver>, Receiver<Notification>) {
        let observer = Arc::new(DryRunObserver::scripted(steps));
        let (tx, rx) = broadcast::channel(32);
        let mut tracker = FocusTracker::new(observer.clone(), tx, settings());
        tracker.start();
        (tracker, observer, rx)
    }

    fn drain(rx: &mut Receiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }

    fn terminal() -> Result<FocusObservation, String> {
        Ok(FocusObservation::new("Terminal", "claude"))
    }

    fn deck() -> Result<FocusObservation, String> {
        Ok(FocusObservation::new("Google Chrome", "VibeDeck"))
    }

    fn focus(app: &str, title: &str, connected: bool) -> Notification {
        Notification::WindowFocus(FocusNotification {
            app: app.to_string(),
            title: title.to_string(),
            connected,
        })
    }

    #[tokio::test]
    async fn identical_observations_notify_once() {
        let (mut tracker, _, mut rx) = started_tracker(vec![terminal(), terminal()]);

        assert!(matches!(tracker.tick().await, TickOutcome::Notified(_)));
        assert_eq!(tracker.tick().await, TickOutcome::Unchanged);

        assert_eq!(drain(&mut rx), vec![focus("Terminal", "claude", true)]);
    }

    #[tokio::test]
    async fn sticky_target_survives_self_focus() {
        let (mut tracker, _, mut rx) = started_tracker(vec![terminal(), deck(), terminal()]);

        for _ in 0..3 {
            tracker.tick().await;
        }

        assert_eq!(
            drain(&mut rx),
            vec![
                focus("Terminal", "claude", true),
                focus("Terminal", "(VibeDeck active, target: Terminal)", true),
                focus("Terminal", "claude", true),
            ]
        );
        assert_eq!(tracker.current_target().as_deref(), Some("Terminal"));
    }

    #[tokio::test]
    async fn self_focus_without_target_is_not_connected() {
        let (mut tracker, _, mut rx) = started_tracker(vec![deck()]);
        tracker.tick().await;

        assert_eq!(drain(&mut rx), vec![focus("Google Chrome", "VibeDeck", false)]);
        assert_eq!(tracker.current_target(), None);
    }

    #[tokio::test]
    async fn other_browser_tab_becomes_target() {
        let (mut tracker, _, mut rx) = started_tracker(vec![Ok(FocusObservation::new("Safari", "Rust docs"))]);
        tracker.tick().await;

        assert_eq!(drain(&mut rx), vec![focus("Safari", "Rust docs", true)]);
    }

    #[tokio::test]
    async fn title_change_in_same_app_notifies() {
        let (mut tracker, _, mut rx) = started_tracker(vec![
            terminal(),
            Ok(FocusObservation::new("Terminal", "vim")),
        ]);
        tracker.tick().await;
        tracker.tick().await;

        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn three_failures_disable_polling() {
        let fail = || Err("not authorized".to_string());
        let (mut tracker, observer, mut rx) = started_tracker(vec![fail(), fail(), fail()]);

        assert_eq!(tracker.tick().await, TickOutcome::Failed { consecutive: 1 });
        assert_eq!(tracker.tick().await, TickOutcome::Failed { consecutive: 2 });
        assert_eq!(tracker.tick().await, TickOutcome::Disabled);
        assert_eq!(tracker.status(), PollStatus::Idle);

        // Четвёртый тик ОС уже не опрашивает
        assert_eq!(tracker.tick().await, TickOutcome::Idle);
        assert_eq!(observer.queries(), 3);

        let notifications = drain(&mut rx);
        assert_eq!(notifications.len(), 1);
        assert!(matches!(
            &notifications[0],
            Notification::System(SystemMessage { level: crate::events::focus::MessageLevel::Error, .. })
        ));
    }

    #[tokio::test]
    async fn success_resets_error_count() {
        let fail = || Err("timeout".to_string());
        let (mut tracker, _, _rx) = started_tracker(vec![fail(), fail(), terminal(), fail(), fail()]);

        for _ in 0..5 {
            tracker.tick().await;
        }

        assert_eq!(tracker.status(), PollStatus::Polling);
    }

    #[tokio::test]
    async fn stop_discards_state_and_target() {
        let (mut tracker, _, _rx) = started_tracker(vec![terminal()]);
        let handle = tracker.target_handle();
        tracker.tick().await;
        assert_eq!(handle.current_target().as_deref(), Some("Terminal"));

        tracker.stop();
        assert_eq!(handle.current_target(), None);
        assert_eq!(tracker.tick().await, TickOutcome::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_stops_itself_after_threshold() {
        let observer = Arc::new(DryRunObserver::scripted(vec![Err("denied".to_string())]));
        let (tx, mut rx) = broadcast::channel(8);
        let tracker = FocusTracker::new(observer.clone(), tx, settings());

        tracker.run(CancellationToken::new()).await;

        assert_eq!(observer.queries(), 3);
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_honours_cancellation() {
        let observer = Arc::new(DryRunObserver::scripted(vec![terminal()]));
        let (tx, _rx) = broadcast::channel(8);
        let tracker = FocusTracker::new(observer.clone(), tx, settings());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(tracker.run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(1200)).await;
        cancel.cancel();
        handle.await.unwrap();

        // Тики в 0, 500 и 1000 мс
        assert_eq!(observer.queries(), 3);
    }
}
