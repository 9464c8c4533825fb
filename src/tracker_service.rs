// src/tracker_service.rs

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AppConfig;
use crate::extractor;
use crate::fetcher::{FetchError, PageFetcher};
use crate::merger;
use crate::models::{OrganizationRecord, ScrapedReading, SeedEntry};
use crate::store::OrganizationStore;

/// Ошибки трекера
#[derive(Debug)]
pub enum TrackerError {
    NotFound(String),
    Fetcher(FetchError),
    Csv(String),
}

impl From<FetchError> for TrackerError {
    fn from(e: FetchError) -> Self {
        TrackerError::Fetcher(e)
    }
}

impl From<csv::Error> for TrackerError {
    fn from(e: csv::Error) -> Self {
        TrackerError::Csv(e.to_string())
    }
}

impl std::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerError::NotFound(id) => write!(f, "organization not found: {}", id),
            TrackerError::Fetcher(e) => write!(f, "fetch error: {}", e),
            TrackerError::Csv(e) => write!(f, "csv error: {}", e),
        }
    }
}

impl std::error::Error for TrackerError {}

/// Сводка по всем организациям
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub organization_count: usize,
    pub total_raised: f64,
    pub total_donors: u64,
    pub total_goal: f64,
    pub average_gift: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Счётчики bulk-обновления
#[derive(Serialize, Debug)]
pub struct BulkSummary {
    pub total: usize,
    pub success: usize,
    pub errors: usize,
}

/// Итог bulk-обновления: по одному исходу на каждую организацию, без пропусков
#[derive(Serialize, Debug)]
pub struct BulkOutcome {
    pub results: HashMap<String, &'static str>,
    pub data: HashMap<String, OrganizationRecord>,
    pub summary: BulkSummary,
}

/// Сервис трекера: владеет хранилищем и загрузчиком, оркестрирует
/// fetch → extract → merge. Создаётся один раз и передаётся через Arc.
pub struct TrackerService {
    store: OrganizationStore,
    fetcher: PageFetcher,
    batch_delay: Duration,
    pub config: AppConfig,
}

impl TrackerService {
    /// Собрать сервис и засеять хранилище из стартового списка
    pub fn new(config: AppConfig, seeds: Vec<SeedEntry>) -> Result<Self, TrackerError> {
        let fetcher = PageFetcher::new(&config)?;
        Ok(Self {
            store: OrganizationStore::seed(seeds),
            fetcher,
            batch_delay: Duration::from_millis(config.batch_delay_ms),
            config,
        })
    }

    /// Снимок id -> запись
    pub async fn organizations(&self) -> HashMap<String, OrganizationRecord> {
        self.store.snapshot().await
    }

    /// Обновить одну организацию. Неудачный fetch не ошибка вызова:
    /// он превращается в слитую запись с заполненным error.
    pub async fn refresh_one(&self, id: &str) -> Result<OrganizationRecord, TrackerError> {
        let previous = self
            .store
            .get(id)
            .await
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;

        let reading = match self.fetcher.fetch(&previous.url).await {
            Ok(body) => extractor::extract(&body),
            Err(e) => ScrapedReading::failed(e.to_string()),
        };

        let merged = merger::merge(&previous, &reading, &previous.name);
        self.store.update(merged.clone()).await;

        match &merged.error {
            Some(err) => tracing::warn!(org = id, error = %err, "обновление завершилось ошибкой"),
            None => tracing::info!(
                org = id,
                total = merged.total,
                donors = merged.donors,
                "обновлено"
            ),
        }
        Ok(merged)
    }

    /// Обновить все организации по очереди, в порядке вставки, с паузой
    /// между ними. Ошибка одной организации не прерывает обход.
    pub async fn refresh_all(&self) -> BulkOutcome {
        let ids = self.store.ids().await;
        let mut results = HashMap::new();
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }
            let outcome = match self.refresh_one(id).await {
                Ok(record) if record.error.is_none() => "success",
                _ => "error",
            };
            results.insert(id.clone(), outcome);
        }

        let success = results.values().filter(|v| **v == "success").count();
        let total = results.len();
        BulkOutcome {
            summary: BulkSummary {
                total,
                success,
                errors: total - success,
            },
            results,
            data: self.store.snapshot().await,
        }
    }

    /// Агрегаты по хранилищу; averageGift никогда не NaN
    pub async fn summary(&self) -> Summary {
        let records = self.store.all().await;
        let total_raised: f64 = records.iter().map(|r| r.total).sum();
        let total_donors: u64 = records.iter().map(|r| r.donors).sum();
        let total_goal: f64 = records.iter().map(|r| r.goal).sum();
        let average_gift = if total_donors > 0 {
            (total_raised / total_donors as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };
        Summary {
            organization_count: records.len(),
            total_raised,
            total_donors,
            total_goal,
            average_gift,
            last_updated: records.iter().filter_map(|r| r.last_updated).max(),
        }
    }

    /// CSV-выгрузка: заголовок + строка на организацию в порядке хранилища,
    /// каждое поле в кавычках, кавычки внутри удваиваются
    pub async fn export_csv(&self) -> Result<String, TrackerError> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(vec![]);
        writer.write_record([
            "id",
            "name",
            "url",
            "total",
            "donors",
            "goal",
            "lastUpdated",
            "error",
        ])?;
        for record in self.store.all().await {
            let total = record.total.to_string();
            let donors = record.donors.to_string();
            let goal = record.goal.to_string();
            let last_updated = record
                .last_updated
                .map(|t| t.to_rfc3339())
                .unwrap_or_default();
            writer.write_record([
                record.id.as_str(),
                record.name.as_str(),
                record.url.as_str(),
                total.as_str(),
                donors.as_str(),
                goal.as_str(),
                last_updated.as_str(),
                record.error.as_deref().unwrap_or(""),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| TrackerError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| TrackerError::Csv(e.to_string()))
    }
}
