// src/fetcher.rs

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::config::AppConfig;

const RETRY_BASE_MS: u64 = 500;

/// Ошибки загрузки страницы
#[derive(Debug)]
pub enum FetchError {
    /// Транспортная ошибка: DNS, таймаут, кривой URL. Не повторяется.
    Request(reqwest::Error),
    /// Не-2xx статус после исчерпания попыток
    Status { status: StatusCode, url: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Request(e)
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Request(e) => write!(f, "request error: {}", e),
            FetchError::Status { status, url } => write!(f, "HTTP {} from {}", status, url),
        }
    }
}

impl std::error::Error for FetchError {}

/// Загрузчик страниц: общий reqwest-клиент с таймаутом и своим User-Agent
pub struct PageFetcher {
    client: Client,
    max_attempts: u32,
}

impl PageFetcher {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            max_attempts: config.max_fetch_attempts.max(1),
        })
    }

    /// GET с ограниченными повторами. Повторяем только 429 и 5xx,
    /// с экспоненциальной паузой; остальные ошибки отдаются сразу.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt: u32 = 1;
        loop {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response.text().await?);
            }

            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if !retryable || attempt >= self.max_attempts {
                return Err(FetchError::Status {
                    status,
                    url: url.to_string(),
                });
            }

            let backoff = Duration::from_millis(RETRY_BASE_MS << (attempt - 1).min(6));
            tracing::warn!(url, %status, attempt, ?backoff, "повтор после паузы");
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }
}
