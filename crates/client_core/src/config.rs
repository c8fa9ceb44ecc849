use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use crate::{
    controller::SearchOptions, debounce::DEFAULT_QUIET_INTERVAL, pagination::DEFAULT_WINDOW_SIZE,
    query::DEFAULT_PAGE_SIZE,
};

pub const DEFAULT_CONFIG_FILE: &str = "teambuilder.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub page_size: u32,
    pub debounce_ms: u64,
    pub pagination_window: u32,
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000/api/v1".into(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_QUIET_INTERVAL.as_millis() as u64,
            pagination_window: DEFAULT_WINDOW_SIZE,
            access_token: None,
            request_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            page_size: self.page_size,
            quiet_interval: Duration::from_millis(self.debounce_ms),
            window_size: self.pagination_window,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    page_size: Option<u32>,
    debounce_ms: Option<u64>,
    pagination_window: Option<u32>,
    access_token: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `teambuilder.toml` in the working directory if it parses,
/// then environment overrides.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            apply_file_settings(&mut settings, file_cfg);
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Like [`load_settings`] but with an explicit file that must exist and parse.
pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    let file_cfg = toml::from_str::<FileSettings>(&raw)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))?;

    let mut settings = Settings::default();
    apply_file_settings(&mut settings, file_cfg);
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = normalize_server_url(&v);
    }
    if let Some(v) = file_cfg.page_size.filter(|v| *v > 0) {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.debounce_ms {
        settings.debounce_ms = v;
    }
    if let Some(v) = file_cfg.pagination_window.filter(|v| *v > 0) {
        settings.pagination_window = v;
    }
    if let Some(v) = file_cfg.access_token.filter(|v| !v.trim().is_empty()) {
        settings.access_token = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs.filter(|v| *v > 0) {
        settings.request_timeout_secs = v;
    }
}

fn apply_env_overrides<F>(settings: &mut Settings, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = var("TEAMBUILDER_SERVER_URL") {
        settings.server_url = normalize_server_url(&v);
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = normalize_server_url(&v);
    }

    if let Some(parsed) = var("APP__PAGE_SIZE").and_then(|v| v.trim().parse::<u32>().ok()) {
        if parsed > 0 {
            settings.page_size = parsed;
        }
    }
    if let Some(parsed) = var("APP__DEBOUNCE_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
        settings.debounce_ms = parsed;
    }
    if let Some(parsed) = var("APP__PAGINATION_WINDOW").and_then(|v| v.trim().parse::<u32>().ok())
    {
        if parsed > 0 {
            settings.pagination_window = parsed;
        }
    }
    if let Some(parsed) =
        var("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok())
    {
        if parsed > 0 {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = var("APP__ACCESS_TOKEN") {
        let v = v.trim();
        if !v.is_empty() {
            settings.access_token = Some(v.to_string());
        }
    }
}

fn normalize_server_url(raw: &str) -> String {
    let raw = raw.trim().trim_end_matches('/');
    if raw.is_empty() {
        return Settings::default().server_url;
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_values() {
        let settings = Settings::default();
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.debounce_ms, 400);
        assert_eq!(settings.pagination_window, 8);
        assert!(settings.access_token.is_none());
    }

    #[test]
    fn file_values_are_applied_and_url_normalized() {
        let raw = r#"
            server_url = " https://builder.example.org/api/v1/ "
            page_size = 25
            debounce_ms = 250
            access_token = "abc"
        "#;
        let mut settings = Settings::default();
        apply_file_settings(&mut settings, toml::from_str(raw).expect("toml"));

        assert_eq!(settings.server_url, "https://builder.example.org/api/v1");
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.debounce_ms, 250);
        assert_eq!(settings.access_token.as_deref(), Some("abc"));
        assert_eq!(settings.pagination_window, 8);
    }

    #[test]
    fn env_overrides_win_and_bad_numbers_are_ignored() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            env_from(&[
                ("TEAMBUILDER_SERVER_URL", "http://a:1/api/v1"),
                ("APP__SERVER_URL", "http://b:2/api/v1/"),
                ("APP__PAGE_SIZE", "lots"),
                ("APP__PAGINATION_WINDOW", "0"),
                ("APP__DEBOUNCE_MS", "150"),
                ("APP__ACCESS_TOKEN", "  "),
            ]),
        );

        assert_eq!(settings.server_url, "http://b:2/api/v1");
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.pagination_window, 8);
        assert_eq!(settings.debounce_ms, 150);
        assert!(settings.access_token.is_none());
        assert_eq!(
            settings.search_options().quiet_interval,
            Duration::from_millis(150)
        );
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let missing = env::temp_dir().join(format!("teambuilder_missing_{suffix}.toml"));
        let err = load_settings_from(&missing).expect_err("missing file");
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("teambuilder_cfg_{suffix}.toml"));
        fs::write(&path, "pagination_window = 5\nrequest_timeout_secs = 3\n").expect("write");

        let settings = load_settings_from(&path).expect("settings");
        assert_eq!(settings.pagination_window, 5);
        assert_eq!(settings.request_timeout_secs, 3);

        fs::remove_file(path).expect("cleanup");
    }
}
