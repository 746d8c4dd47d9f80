//! Internationalization (i18n) module for PlanFE.
//!
//! Simple key→string HashMap loaded at startup from embedded translation
//! data. The `t!("key")` macro looks up the current language, falling back
//! to English. Language can be switched at runtime via `set_language()`.

use std::collections::HashMap;
use std::sync::Mutex;

/// Global translation state.
static I18N: Mutex<Option<I18nState>> = Mutex::new(None);

struct I18nState {
    current_lang: String,
    /// lang_code → (key → translated_string)
    translations: HashMap<String, HashMap<String, String>>,
}

/// Supported languages: (code, native_name)
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Español"),
    ("fr", "Français"),
    ("de", "Deutsch"),
];

/// Initialize the i18n system with embedded translations.
/// Call once at startup.
pub fn init() {
    let mut translations: HashMap<String, HashMap<String, String>> = HashMap::new();

    translations.insert(
        "en".to_string(),
        parse_translations(include_str!("../locales/en.txt")),
    );
    translations.insert(
        "es".to_string(),
        parse_translations(include_str!("../locales/es.txt")),
    );
    translations.insert(
        "fr".to_string(),
        parse_translations(include_str!("../locales/fr.txt")),
    );
    translations.insert(
        "de".to_string(),
        parse_translations(include_str!("../locales/de.txt")),
    );

    let state = I18nState {
        current_lang: "en".to_string(),
        translations,
    };
    *I18N.lock().unwrap() = Some(state);
}

/// Set the active language. If `code` is not a known language, falls back to "en".
pub fn set_language(code: &str) {
    if let Ok(mut guard) = I18N.lock()
        && let Some(ref mut state) = *guard
    {
        if state.translations.contains_key(code) {
            state.current_lang = code.to_string();
        } else {
            state.current_lang = "en".to_string();
        }
    }
}

/// Get the current language code.
pub fn current_language() -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        return state.current_lang.clone();
    }
    "en".to_string()
}

/// Look up a translation key. Returns the translated string if found,
/// or falls back to English, or returns the key itself as last resort.
pub fn translate(key: &str) -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        // Try current language
        if let Some(map) = state.translations.get(&state.current_lang)
            && let Some(val) = map.get(key)
        {
            return val.clone();
        }
        // Fallback to English
        if state.current_lang != "en"
            && let Some(map) = state.translations.get("en")
            && let Some(val) = map.get(key)
        {
            return val.clone();
        }
    }
    // Last resort: return the key itself
    key.to_string()
}

/// Detect the system language and return the best matching language code.
/// Returns "en" if no match is found.
pub fn detect_system_language() -> String {
    // Try Windows API first
    #[cfg(target_os = "windows")]
    {
        if let Some(lang) = detect_windows_language() {
            return lang;
        }
    }

    // Try LANG / LC_ALL environment variables (Linux/macOS, sometimes set on Windows)
    for var in &["LANG", "LC_ALL", "LC_MESSAGES", "LANGUAGE"] {
        if let Ok(val) = std::env::var(var)
            && let Some(lang) = match_system_locale(&val)
        {
            return lang;
        }
    }

    "en".to_string()
}

#[cfg(target_os = "windows")]
fn detect_windows_language() -> Option<String> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;

    // Use GetUserDefaultLocaleName
    unsafe extern "system" {
        fn GetUserDefaultLocaleName(lp_locale_name: *mut u16, cch_locale_name: i32) -> i32;
    }

    let mut buf = [0u16; 85]; // LOCALE_NAME_MAX_LENGTH
    let len = unsafe { GetUserDefaultLocaleName(buf.as_mut_ptr(), buf.len() as i32) };
    if len > 0 {
        let os_str = OsString::from_wide(&buf[..((len - 1) as usize)]);
        if let Some(locale_str) = os_str.to_str() {
            return match_system_locale(locale_str);
        }
    }
    None
}

/// Match a system locale string (e.g. "en_US.UTF-8", "fr-FR", "de_DE") to our supported languages.
fn match_system_locale(locale: &str) -> Option<String> {
    // Normalize: lowercase, replace _ with -
    let normalized = locale.to_lowercase().replace('_', "-");

    // Extract language part (before any '.' or '@')
    let lang_part = normalized.split('.').next().unwrap_or(&normalized);
    let lang_part = lang_part.split('@').next().unwrap_or(lang_part);

    // Try exact match first
    for &(code, _) in LANGUAGES {
        if code.to_lowercase() == lang_part {
            return Some(code.to_string());
        }
    }

    // Try prefix match (e.g., "fr-fr" → "fr", "es-mx" → "es")
    let primary = lang_part.split('-').next().unwrap_or(lang_part);
    for &(code, _) in LANGUAGES {
        let code_primary = code.split('-').next().unwrap_or(code);
        if code_primary.to_lowercase() == primary {
            return Some(code.to_string());
        }
    }

    None
}

/// Parse a simple key=value translation file.
/// Format: one `key=value` per line. Lines starting with `#` are comments. Empty lines ignored.
fn parse_translations(data: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            map.insert(key.trim().to_string(), val.trim().to_string());
        }
    }
    map
}

/// Translation macro. Usage: `t!("menu.file")` or `t!("panel.toggle_for", name = "Walls")`
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::translate($key)
    };
    ($key:expr, $($name:ident = $val:expr),+ $(,)?) => {{
        let mut s = $crate::i18n::translate($key);
        $(
            s = s.replace(concat!("{", stringify!($name), "}"), &format!("{}", $val));
        )+
        s
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_matching_prefers_exact_then_prefix() {
        assert_eq!(match_system_locale("en_US.UTF-8"), Some("en".to_string()));
        assert_eq!(match_system_locale("fr-FR"), Some("fr".to_string()));
        assert_eq!(match_system_locale("de_DE@euro"), Some("de".to_string()));
        assert_eq!(match_system_locale("es-MX"), Some("es".to_string()));
        assert_eq!(match_system_locale("ko_KR"), None);
    }

    #[test]
    fn translation_files_parse_comments_and_blanks() {
        let map = parse_translations("# comment\n\nmenu.file=File\n  panel.title = Layers  \n");
        assert_eq!(map.get("menu.file").map(String::as_str), Some("File"));
        assert_eq!(map.get("panel.title").map(String::as_str), Some("Layers"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn every_locale_covers_the_english_key_set() {
        let en = parse_translations(include_str!("../locales/en.txt"));
        for (file, data) in [
            ("es", include_str!("../locales/es.txt")),
            ("fr", include_str!("../locales/fr.txt")),
            ("de", include_str!("../locales/de.txt")),
        ] {
            let map = parse_translations(data);
            for key in en.keys() {
                assert!(map.contains_key(key), "{}.txt is missing key {}", file, key);
            }
        }
    }
}
