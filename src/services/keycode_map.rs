use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Именованные клавиши аккордов: виртуальные коды macOS и keysym-ы X11.
/// Одиночные символы ("k", "1", "/") сюда не попадают и печатаются как есть.
pub struct KeycodeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedKey {
    pub mac_key_code: u16,
    pub x_keysym: &'static str,
}

const fn key(mac_key_code: u16, x_keysym: &'static str) -> NamedKey {
    NamedKey { mac_key_code, x_keysym }
}

static NAMED_KEYS: Lazy<HashMap<&'static str, NamedKey>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Специальные клавиши
    map.insert("return", key(36, "Return"));
    map.insert("enter", key(36, "Return"));
    map.insert("tab", key(48, "Tab"));
    map.insert("space", key(49, "space"));
    map.insert("delete", key(51, "BackSpace"));
    map.insert("backspace", key(51, "BackSpace"));
    map.insert("escape", key(53, "Escape"));
    map.insert("esc", key(53, "Escape"));
    map.insert("forwarddelete", key(117, "Delete"));

    // Навигация
    map.insert("home", key(115, "Home"));
    map.insert("end", key(119, "End"));
    map.insert("pageup", key(116, "Prior"));
    map.insert("pagedown", key(121, "Next"));

    // Стрелки
    map.insert("left", key(123, "Left"));
    map.insert("right", key(124, "Right"));
    map.insert("down", key(125, "Down"));
    map.insert("up", key(126, "Up"));

    // Функциональные клавиши
    map.insert("f1", key(122, "F1"));
    map.insert("f2", key(120, "F2"));
    map.insert("f3", key(99, "F3"));
    map.insert("f4", key(118, "F4"));
    map.insert("f5", key(96, "F5"));
    map.insert("f6", key(97, "F6"));
    map.insert("f7", key(98, "F7"));
    map.insert("f8", key(100, "F8"));
    map.insert("f9", key(101, "F9"));
    map.insert("f10", key(109, "F10"));
    map.insert("f11", key(103, "F11"));
    map.insert("f12", key(111, "F12"));

    map
});

impl KeycodeMap {
    /// Найти именованную клавишу (регистр не важен)
    pub fn named(key_name: &str) -> Option<NamedKey> {
        if key_name.chars().count() == 1 {
            return None;
        }
        let normalized = key_name.to_lowercase().replace([' ', '_', '-'], "");
        NAMED_KEYS.get(normalized.as_str()).copied()
    }
}
