pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    Stdin,
    File(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub event_source: EventSource,
    pub log_json: bool,
    pub mock: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let path = env_or("TAGGER_EVENT_PATH", "-");
        let event_source = if path.trim() == "-" || path.trim().is_empty() {
            EventSource::Stdin
        } else {
            EventSource::File(path)
        };
        Self {
            event_source,
            log_json: env_bool("TAGGER_LOG_JSON", true),
            mock: std::env::var("MOCK_MODE").is_ok(),
        }
    }
}
