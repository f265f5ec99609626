pub mod permissions;
pub mod process;

// Макросы условного логирования для горячих путей (тик опроса, вызов скрипта)
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}
