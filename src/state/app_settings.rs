use gonawin_api::client::DEFAULT_BASE_URL;
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

pub const API_URL_VAR: &str = "GONAWIN_API_URL";
pub const LOG_VAR: &str = "GONAWIN_LOG";
pub const SESSION_FILE_VAR: &str = "GONAWIN_SESSION_FILE";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api_url: String,
    pub session_file: PathBuf,
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = non_empty(API_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let log_level = non_empty(LOG_VAR).and_then(|v| LevelFilter::from_str(&v).ok());
        let session_file = non_empty(SESSION_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_session_path(non_empty("XDG_CONFIG_HOME"), non_empty("HOME")));

        Self { api_url, session_file, full_screen: false, log_level }
    }
}

fn default_session_path(config_home: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(config_dir) = config_home {
        return PathBuf::from(config_dir).join("gonawin").join("session.json");
    }
    if let Some(home) = home {
        return PathBuf::from(home).join(".config").join("gonawin").join("session.json");
    }
    PathBuf::from("gonawin-session.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings(&[]);
        assert_eq!(s.api_url, DEFAULT_BASE_URL);
        assert_eq!(s.log_level, None);
        assert_eq!(s.session_file, PathBuf::from("gonawin-session.json"));
    }

    #[test]
    fn session_file_prefers_override_then_xdg() {
        let s = settings(&[("HOME", "/home/u"), ("XDG_CONFIG_HOME", "/cfg")]);
        assert_eq!(s.session_file, PathBuf::from("/cfg/gonawin/session.json"));

        let s = settings(&[("HOME", "/home/u")]);
        assert_eq!(s.session_file, PathBuf::from("/home/u/.config/gonawin/session.json"));

        let s = settings(&[("HOME", "/home/u"), (SESSION_FILE_VAR, "/tmp/s.json")]);
        assert_eq!(s.session_file, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!(settings(&[(LOG_VAR, "Debug")]).log_level, Some(LevelFilter::Debug));
        assert_eq!(settings(&[(LOG_VAR, "loud")]).log_level, None);
    }

    #[test]
    fn api_url_override() {
        let s = settings(&[(API_URL_VAR, "https://www.gonawin.com/")]);
        assert_eq!(s.api_url, "https://www.gonawin.com/");
    }
}
