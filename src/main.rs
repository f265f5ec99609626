use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod transport;
mod utils;

use config::{BackendKind, Config, LoggingConfig};
use services::{
    create_synthesizer,
    create_window_observer,
    ActionExecutor,
    ActionQueue,
    FocusSettings,
    FocusTracker,
    TargetHandle,
};
use transport::EventHub;

#[derive(Parser, Debug)]
#[command(name = "vibedeck")]
#[command(about = "Мост между панелью VibeDeck и клавиатурой рабочего стола")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "vibedeck.toml")]
    config: String,

    /// Режим сухого запуска (без реальных нажатий и опроса ОС)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает конфигурацию)
    #[arg(long)]
    log_level: Option<String>,

    /// Бэкенд нажатий и определения окна (перекрывает конфигурацию)
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(backend) = args.backend {
        config.backend.kind = backend;
    }
    config.validate()?;

    // Инициализация системы логирования
    init_tracing(&config.logging)?;

    info!("Запуск VibeDeck v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    let backend = if args.dry_run {
        warn!("Режим сухого запуска - реальные нажатия отключены");
        BackendKind::DryRun
    } else {
        config.backend.kind.resolve()
    };

    utils::permissions::check_environment(backend);

    // Инициализация компонентов
    let (notifier, _) = broadcast::channel(64);
    let cancel = CancellationToken::new();

    let executor = ActionExecutor::new(create_synthesizer(backend, args.dry_run));
    let (queue, mut queue_handle) = ActionQueue::spawn(executor, notifier.clone(), 32);

    let (target, mut focus_handle) = if config.focus.enabled {
        let tracker = FocusTracker::new(
            create_window_observer(backend, args.dry_run),
            notifier.clone(),
            FocusSettings::from_config(&config.focus),
        );
        let target = tracker.target_handle();
        (target, Some(tokio::spawn(tracker.run(cancel.clone()))))
    } else {
        warn!("Отслеживание фокуса отключено в конфигурации");
        (TargetHandle::default(), None)
    };

    let hub = EventHub::new(notifier, queue, target);
    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Не удалось занять адрес {}", config.server.bind))?;

    let server_cancel = cancel.clone();
    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = transport::serve(listener, hub, server_cancel).await {
            error!("Ошибка сервера: {}", e);
        }
    });

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");
    cancel.cancel();

    // Текущее действие доделывается, но не дольше grace period
    let grace_period = Duration::from_millis(config.shutdown.grace_period_ms);
    let shutdown_result = timeout(grace_period, async {
        let _ = (&mut server_handle).await;
        if let Some(handle) = focus_handle.as_mut() {
            let _ = handle.await;
        }
        let _ = (&mut queue_handle).await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => {
            warn!("Таймаут при завершении сервисов ({}мс), прерываем", grace_period.as_millis());
            server_handle.abort();
            if let Some(handle) = focus_handle {
                handle.abort();
            }
            queue_handle.abort();
        }
    }

    info!("VibeDeck завершил работу");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format.as_str() {
        "full" => registry.with(fmt::layer()).init(),
        _ => registry.with(fmt::layer().compact()).init(),
    }

    Ok(())
}
