// src/models/organization.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Запись об организации: последнее известное состояние сбора
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    pub total: f64,
    pub donors: u64,
    pub goal: f64,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl OrganizationRecord {
    /// Начальная запись при посеве: числа нулевые, обновлений ещё не было
    pub fn seeded(id: String, name: String, url: String) -> Self {
        Self {
            id,
            name,
            url,
            total: 0.0,
            donors: 0,
            goal: 0.0,
            last_updated: None,
            error: None,
        }
    }
}

/// Сырое чтение со страницы до sanity-merge.
/// donors здесь f64: правило слияния "конечное число >= 0" применяется единообразно.
#[derive(Debug, Clone)]
pub struct ScrapedReading {
    pub total: f64,
    pub donors: f64,
    pub goal: f64,
    pub fetched_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl ScrapedReading {
    /// Чтение после неудачного fetch: числовых данных нет, только ошибка
    pub fn failed(message: String) -> Self {
        Self {
            total: 0.0,
            donors: 0.0,
            goal: 0.0,
            fetched_at: Utc::now(),
            error: Some(message),
        }
    }
}

/// Элемент фиксированного стартового списка
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SeedEntry {
    pub name: String,
    pub url: String,
}

/// Слаг организации: сегмент пути после `/organization/`, в нижнем регистре.
/// URL без такого сегмента слага не даёт.
pub fn derive_slug(url: &str) -> Option<String> {
    let mut parts = url.split('/');
    while let Some(part) = parts.next() {
        if part.eq_ignore_ascii_case("organization") {
            let next = parts.next()?;
            let slug = next.split(['?', '#']).next().unwrap_or("");
            if slug.is_empty() {
                return None;
            }
            return Some(slug.to_lowercase());
        }
    }
    None
}
