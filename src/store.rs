// src/store.rs

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::models::{derive_slug, OrganizationRecord, SeedEntry};

/// Хранилище записей в памяти. Порядок вставки сохраняется, записи
/// создаются только посевом и живут до конца процесса.
pub struct OrganizationStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    order: Vec<String>,
    records: HashMap<String, OrganizationRecord>,
}

impl OrganizationStore {
    /// Построить хранилище из стартового списка. Записи без слага
    /// (URL не вида `/organization/<slug>`) и дубликаты пропускаются.
    pub fn seed(entries: Vec<SeedEntry>) -> Self {
        let mut inner = Inner::default();
        for entry in entries {
            let Some(id) = derive_slug(&entry.url) else {
                tracing::warn!(url = %entry.url, "URL без сегмента /organization/, запись пропущена");
                continue;
            };
            if inner.records.contains_key(&id) {
                tracing::warn!(id = %id, "дубликат слага, запись пропущена");
                continue;
            }
            inner.order.push(id.clone());
            inner
                .records
                .insert(id.clone(), OrganizationRecord::seeded(id, entry.name, entry.url));
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Идентификаторы в порядке вставки
    pub async fn ids(&self) -> Vec<String> {
        self.inner.read().await.order.clone()
    }

    pub async fn get(&self, id: &str) -> Option<OrganizationRecord> {
        self.inner.read().await.records.get(id).cloned()
    }

    /// Все записи в порядке вставки
    pub async fn all(&self) -> Vec<OrganizationRecord> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect()
    }

    /// Снимок id -> запись
    pub async fn snapshot(&self) -> HashMap<String, OrganizationRecord> {
        self.inner.read().await.records.clone()
    }

    /// Обновить существующую запись на месте. Новые записи через
    /// update не появляются: состав хранилища фиксируется посевом.
    pub async fn update(&self, record: OrganizationRecord) {
        let mut inner = self.inner.write().await;
        if let Some(slot) = inner.records.get_mut(&record.id) {
            *slot = record;
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }
}
