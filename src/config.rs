// src/config.rs

use std::env;

use crate::models::SeedEntry;

/// Конфигурация приложения из переменных окружения
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Таймаут HTTP-запроса к странице сбора, секунды
    pub request_timeout_secs: u64,
    /// Максимум попыток загрузки одной страницы
    pub max_fetch_attempts: u32,
    /// Пауза между организациями при bulk-обновлении, миллисекунды
    pub batch_delay_ms: u64,
    /// Разрешённые CORS-источники; "*" — любые
    pub allowed_origins: Vec<String>,
    pub user_agent: String,
}

fn default_request_timeout() -> u64 {
    12
}

fn default_max_attempts() -> u32 {
    3
}

fn default_batch_delay() -> u64 {
    400
}

fn default_user_agent() -> String {
    "FundTrackBot/0.1 (nonprofit fundraising dashboard)".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            max_fetch_attempts: default_max_attempts(),
            batch_delay_ms: default_batch_delay(),
            allowed_origins: vec!["*".to_string()],
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Прочитать конфигурацию из окружения; кривые значения заменяются дефолтами
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            request_timeout_secs: env_parse("FUNDTRACK_TIMEOUT_SECS", defaults.request_timeout_secs),
            max_fetch_attempts: env_parse("FUNDTRACK_MAX_ATTEMPTS", defaults.max_fetch_attempts)
                .max(1),
            batch_delay_ms: env_parse("FUNDTRACK_BATCH_DELAY_MS", defaults.batch_delay_ms),
            allowed_origins: env_list("FUNDTRACK_ALLOWED_ORIGINS", defaults.allowed_origins),
            user_agent: env::var("FUNDTRACK_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str, default: Vec<String>) -> Vec<String> {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    let items: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() { default } else { items }
}

/// Фиксированный стартовый список отслеживаемых организаций
pub fn default_organizations() -> Vec<SeedEntry> {
    [
        (
            "Hope Harbor Foundation",
            "https://www.mightycause.com/organization/Hope-Harbor-Foundation",
        ),
        (
            "Riverside Animal Rescue",
            "https://www.mightycause.com/organization/Riverside-Animal-Rescue",
        ),
        (
            "Bright Futures Scholarship Fund",
            "https://www.mightycause.com/organization/Bright-Futures-Scholarship-Fund",
        ),
        (
            "Community Food Pantry Network",
            "https://www.mightycause.com/organization/Community-Food-Pantry-Network",
        ),
        (
            "Open Door Shelter",
            "https://www.mightycause.com/organization/Open-Door-Shelter",
        ),
        (
            "Neighborhood Arts Collective",
            "https://www.mightycause.com/organization/Neighborhood-Arts-Collective",
        ),
    ]
    .into_iter()
    .map(|(name, url)| SeedEntry {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}
