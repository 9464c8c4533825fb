// src/merger.rs

use crate::models::{OrganizationRecord, ScrapedReading};

/// Порог подозрительного скачка: новый total больше прежнего более чем в 5 раз
const JUMP_FACTOR: f64 = 5.0;

/// Слить свежее чтение с прошлой записью. Политика доверия, а не слепая
/// перезапись: неправдоподобный скачок total отбрасывается, отсутствующие
/// значения добираются из прошлого состояния.
///
/// Правила по полям, независимо друг от друга:
/// - total: непозитивное или неконечное — оставить прежнее; прежнее > 0 и
///   новое > прежнее×5 — отбросить с предупреждением; иначе принять.
///   Прежний ноль означает "ещё ни разу не прочитано" и принимает любое
///   положительное значение.
/// - donors, goal: принять, если конечное число >= 0, иначе оставить прежнее.
/// - last_updated: всегда время этой попытки. error: ошибка чтения или None.
pub fn merge(
    previous: &OrganizationRecord,
    scraped: &ScrapedReading,
    label: &str,
) -> OrganizationRecord {
    let mut merged = previous.clone();
    merged.last_updated = Some(scraped.fetched_at);
    merged.error = scraped.error.clone();

    // Неудачный fetch: числовые поля не трогаем
    if scraped.error.is_some() {
        return merged;
    }

    if scraped.total.is_finite() && scraped.total > 0.0 {
        if previous.total > 0.0 && scraped.total > previous.total * JUMP_FACTOR {
            tracing::warn!(
                org = label,
                previous = previous.total,
                scraped = scraped.total,
                "подозрительный скачок total, значение отброшено"
            );
        } else {
            merged.total = scraped.total;
        }
    }

    if scraped.donors.is_finite() && scraped.donors >= 0.0 {
        merged.donors = scraped.donors as u64;
    }

    if scraped.goal.is_finite() && scraped.goal >= 0.0 {
        merged.goal = scraped.goal;
    }

    merged
}
