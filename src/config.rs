use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const APP_DIR: &str = "betmind_terminal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalystSource {
    Gemini,
    Demo,
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

/// Process-wide settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub analyst: AnalystSource,
    pub alerts_enabled: bool,
    pub store_dir: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub log_filter: String,
    pub admin: Option<AdminCredentials>,
}

impl Settings {
    pub fn from_env() -> Self {
        let api_key = non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("API_KEY"));
        let analyst = match non_empty_var("BETMIND_ANALYST")
            .unwrap_or_else(|| "auto".to_string())
            .to_lowercase()
            .as_str()
        {
            "demo" => AnalystSource::Demo,
            "gemini" => AnalystSource::Gemini,
            _ if api_key.is_some() => AnalystSource::Gemini,
            _ => AnalystSource::Demo,
        };
        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(90)
            .max(10);
        let admin = match (
            non_empty_var("BETMIND_ADMIN_EMAIL"),
            non_empty_var("BETMIND_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminCredentials { email, password }),
            _ => None,
        };

        Self {
            api_key,
            model: non_empty_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty_var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            analyst,
            alerts_enabled: parse_flag(non_empty_var("BETMIND_ALERTS").as_deref(), true),
            store_dir: non_empty_var("BETMIND_STORE_DIR")
                .map(PathBuf::from)
                .or_else(default_store_dir),
            export_dir: non_empty_var("BETMIND_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_dir: non_empty_var("BETMIND_LOG_DIR")
                .map(PathBuf::from)
                .or_else(default_log_dir),
            log_filter: non_empty_var("BETMIND_LOG").unwrap_or_else(|| "info".to_string()),
            admin,
        }
    }
}

pub fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_store_dir() -> Option<PathBuf> {
    // Prefer XDG config.
    if let Some(base) = non_empty_var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = non_empty_var("HOME")?;
    Some(PathBuf::from(home).join(".config").join(APP_DIR))
}

fn default_log_dir() -> Option<PathBuf> {
    if let Some(base) = non_empty_var("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(APP_DIR).join("logs"));
    }
    let home = non_empty_var("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(APP_DIR).join("logs"))
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn flags_fall_back_to_default() {
        assert!(parse_flag(Some("on"), false));
        assert!(!parse_flag(Some("0"), true));
        assert!(parse_flag(Some("maybe"), true));
        assert!(!parse_flag(None, false));
    }
}
