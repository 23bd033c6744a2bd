use crate::config;

/// Load settings, falling back to defaults. The second value explains a
/// fallback so it can be logged once logging is up.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => {
                let notice = format!("invalid config, using defaults: {msg}");
                eprintln!("lekompo: {notice}");
                (config::Settings::default(), Some(notice))
            }
        },
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            let notice = format!("failed to load config, using defaults: {e}");
            eprintln!("lekompo: {notice}");
            (config::Settings::default(), Some(notice))
        }
    }
}
