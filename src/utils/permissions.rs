use crate::config::BackendKind;
use crate::utils::process::is_in_path;
use tracing::{info, warn};

/// Проверить окружение для выбранного бэкенда. Ничего не запрещает: без
/// нужной утилиты сервер работает, но нажатия и фокус будут падать.
pub fn check_environment(kind: BackendKind) {
    info!("Проверка окружения для бэкенда {:?}...", kind);

    match kind {
        BackendKind::AppleScript => check_tool("osascript", kind),
        BackendKind::Xdotool => {
            check_tool("xdotool", kind);
            check_display();
        }
        BackendKind::DryRun | BackendKind::Auto => {
            info!("Сухой запуск - проверка утилит пропущена");
            return;
        }
    }

    check_not_root();
    info!("Проверка окружения завершена");
}

fn check_tool(program: &str, kind: BackendKind) {
    if is_in_path(program) {
        info!("{} найден в PATH", program);
        return;
    }

    warn!("{} не найден в PATH - действия и определение окна работать не будут", program);
    for hint in setup_hints(kind) {
        warn!("   {}", hint);
    }
}

fn check_display() {
    if std::env::var_os("DISPLAY").is_none() {
        warn!("Переменная DISPLAY не задана - xdotool не сможет подключиться к X-серверу");
    }

    if std::env::var("XDG_SESSION_TYPE").map(|s| s == "wayland").unwrap_or(false) {
        warn!("Сессия Wayland: xdotool видит и управляет только окнами XWayland");
    }
}

fn check_not_root() {
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            warn!("⚠️  Приложение запущено от имени root!");
            warn!("   Нажатия уйдут в сессию root, а не в сессию пользователя");
        }
        Ok(user) => {
            info!("Приложение запущено от имени пользователя: {}", user);
        }
        Err(_) => {
            warn!("Не удалось определить пользователя");
        }
    }
}

/// Подсказки по настройке для выбранного бэкенда
pub fn setup_hints(kind: BackendKind) -> Vec<&'static str> {
    match kind {
        BackendKind::AppleScript => vec![
            "osascript входит в macOS; проверьте PATH (/usr/bin)",
            "Нажатия: System Settings > Privacy & Security > Accessibility > добавьте терминал",
            "Определение окна: System Settings > Privacy & Security > Screen Recording > добавьте терминал",
        ],
        BackendKind::Xdotool => vec![
            "Установите xdotool: sudo apt install xdotool (или пакет вашего дистрибутива)",
            "Запускайте сервер внутри графической сессии X11",
        ],
        BackendKind::DryRun | BackendKind::Auto => Vec::new(),
    }
}
