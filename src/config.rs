use std::env;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub required: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub student_list_limit: i64,
    pub gemini: GeminiConfig,
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_bool(key: &str) -> bool {
    env::var(key)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            student_list_limit: env_parse("STUDENT_LIST_LIMIT", 50),
            gemini: GeminiConfig {
                api_key: env_nonempty("GEMINI_API_KEY"),
                model: env_nonempty("GEMINI_MODEL")
                    .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
                required: env_bool("GEMINI_REQUIRED"),
                timeout_secs: env_parse("GEMINI_TIMEOUT_SECS", 25),
            },
        }
    }
}
