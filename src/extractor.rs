// src/extractor.rs
//
// Эвристическое извлечение показателей сбора из слабо структурированного
// HTML. Каждый проход — чистая функция Option<f64>, по каждому полю
// побеждает первый сработавший проход.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::models::ScrapedReading;

static DOLLAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s*([0-9][0-9,]*(?:\.[0-9]+)?)").unwrap());
static DONORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9][0-9,]*)\s*\+?\s*(?:donors?|supporters?)\b").unwrap());
static GOAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)goal[:\s]+\$\s*([0-9][0-9,]*(?:\.[0-9]+)?)").unwrap());
static OF_GOAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)of\s+\$\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s+goal").unwrap());
static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*%\s*(?:complete|raised|funded)").unwrap());
static LD_JSON_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Извлечь показатели из HTML. Никогда не падает: в худшем случае
/// все числа нулевые. Ошибки сети — забота загрузчика, не экстрактора.
pub fn extract(html: &str) -> ScrapedReading {
    let doc = Html::parse_document(html);
    let nodes = visible_text_nodes(&doc);
    let text = nodes.join(" ");

    // Проход 1: структурированные данные (JSON-LD)
    let (s_total, s_donors, s_goal) = structured_pass(&doc);

    // Проходы 2-3: текст рядом со словом "raised" и размеченные шаблоны
    let mut total = s_total.or_else(|| proximity_total(&nodes));
    let donors = s_donors.or_else(|| labeled_donors(&text));
    let mut goal = s_goal.or_else(|| labeled_goal(&text));

    // Проход 4: известна ровно одна из пары total/goal — вторую даёт процент
    if total.is_some() != goal.is_some() {
        if let Some(pct) = percent_complete(&text) {
            match (total, goal) {
                (Some(t), None) => goal = Some(t * 100.0 / pct),
                (None, Some(g)) => total = Some(g * pct / 100.0),
                _ => {}
            }
        }
    }

    // Проход 5: медиана всех долларовых чисел на странице
    let total = total.or_else(|| median_dollar(&text));

    ScrapedReading {
        total: total.unwrap_or(0.0),
        donors: donors.unwrap_or(0.0),
        goal: goal.unwrap_or(0.0),
        fetched_at: Utc::now(),
        error: None,
    }
}

/// "$1,234.56" -> 1234.56; всё, кроме цифр и точки, отбрасывается.
/// Непарсящееся или отрицательное значение считается отсутствующим.
fn parse_money(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

/// Текстовые узлы документа без содержимого script/style
fn visible_text_nodes(doc: &Html) -> Vec<String> {
    let mut out = Vec::new();
    for node in doc.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name().to_lowercase()))
            .map(|name| name == "script" || name == "style")
            .unwrap_or(false);
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Проход 1: блоки JSON-LD, рекурсивный поиск ключей amount/donor/goal
fn structured_pass(doc: &Html) -> (Option<f64>, Option<f64>, Option<f64>) {
    const TOTAL_KEYS: &[&str] = &["amountraised", "totalraised", "raised", "raisedamount"];
    const DONOR_KEYS: &[&str] = &[
        "donors",
        "donorcount",
        "donationcount",
        "supporters",
        "contributors",
    ];
    const GOAL_KEYS: &[&str] = &["goal", "goalamount", "target", "targetamount"];

    let mut total = None;
    let mut donors = None;
    let mut goal = None;
    for script in doc.select(&LD_JSON_SEL) {
        let raw: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        if total.is_none() {
            total = find_numeric_key(&value, TOTAL_KEYS);
        }
        if donors.is_none() {
            donors = find_numeric_key(&value, DONOR_KEYS);
        }
        if goal.is_none() {
            goal = find_numeric_key(&value, GOAL_KEYS);
        }
    }
    (total, donors, goal)
}

/// Поиск первого числового значения по нормализованному имени ключа
fn find_numeric_key(value: &Value, keys: &[&str]) -> Option<f64> {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let norm: String = key
                    .chars()
                    .filter(|c| *c != '_' && *c != '-')
                    .collect::<String>()
                    .to_lowercase();
                if keys.contains(&norm.as_str()) {
                    if let Some(n) = numeric_value(nested) {
                        return Some(n);
                    }
                }
            }
            map.values().find_map(|v| find_numeric_key(v, keys))
        }
        Value::Array(items) => items.iter().find_map(|v| find_numeric_key(v, keys)),
        _ => None,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite() && *x >= 0.0),
        Value::String(s) => parse_money(s),
        _ => None,
    }
}

/// Проход 2: узлы со словом "raised" и долларовой суммой; виджеты прогресса
/// повторяют цифру в соседних элементах, кумулятивный итог обычно наибольший.
fn proximity_total(nodes: &[String]) -> Option<f64> {
    let mut best: Option<f64> = None;
    for node in nodes {
        if !node.to_lowercase().contains("raised") {
            continue;
        }
        for cap in DOLLAR_RE.captures_iter(node) {
            if let Some(n) = parse_money(&cap[1]) {
                best = Some(best.map_or(n, |b| b.max(n)));
            }
        }
    }
    best
}

/// Проход 3: "<n> donors/supporters"
fn labeled_donors(text: &str) -> Option<f64> {
    DONORS_RE.captures(text).and_then(|cap| parse_money(&cap[1]))
}

/// Проход 3: "goal: $<n>" либо "of $<n> goal"
fn labeled_goal(text: &str) -> Option<f64> {
    GOAL_RE
        .captures(text)
        .and_then(|cap| parse_money(&cap[1]))
        .or_else(|| OF_GOAL_RE.captures(text).and_then(|cap| parse_money(&cap[1])))
}

/// Процент выполнения, только в диапазоне (0; 100]
fn percent_complete(text: &str) -> Option<f64> {
    let pct = PERCENT_RE
        .captures(text)
        .and_then(|cap| cap[1].parse::<f64>().ok())?;
    (pct > 0.0 && pct <= 100.0).then_some(pct)
}

/// Проход 5: средний элемент отсортированных долларовых чисел — защита от
/// одиночного выброса, когда размеченного итога на странице нет
fn median_dollar(text: &str) -> Option<f64> {
    let mut amounts: Vec<f64> = DOLLAR_RE
        .captures_iter(text)
        .filter_map(|cap| parse_money(&cap[1]))
        .collect();
    if amounts.is_empty() {
        return None;
    }
    amounts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(amounts[amounts.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_data_wins() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {"@type":"Organization","fundraising":{"amountRaised":"$12,345.50","donorCount":321,"goalAmount":20000}}
            </script>
            </head><body><p>$99 raised</p></body></html>"#;
        let reading = extract(html);
        assert_eq!(reading.total, 12345.5);
        assert_eq!(reading.donors, 321.0);
        assert_eq!(reading.goal, 20000.0);
    }

    #[test]
    fn test_proximity_takes_maximum_candidate() {
        let html = r#"<div>
            <span>$1,200 raised this week</span>
            <span>$45,000 raised so far</span>
            <span>$500 raised by the youth team</span>
        </div>"#;
        assert_eq!(extract(html).total, 45000.0);
    }

    #[test]
    fn test_labeled_donors_and_goal() {
        let html = "<p>Join 1,024 donors today!</p><p>Goal: $80,000</p>";
        let reading = extract(html);
        assert_eq!(reading.donors, 1024.0);
        assert_eq!(reading.goal, 80000.0);
    }

    #[test]
    fn test_of_goal_phrasing() {
        let html = "<p>Raised so far: $2,000</p><p>That's 20% of $10,000 goal</p>";
        let reading = extract(html);
        assert_eq!(reading.total, 2000.0);
        assert_eq!(reading.goal, 10000.0);
    }

    #[test]
    fn test_percent_derives_goal_from_total() {
        let html = "<p>$5,000 raised</p><p>25% complete</p>";
        let reading = extract(html);
        assert_eq!(reading.total, 5000.0);
        assert_eq!(reading.goal, 20000.0);
    }

    #[test]
    fn test_percent_derives_total_from_goal() {
        let html = "<p>Goal: $10,000</p><p>40% funded</p>";
        let reading = extract(html);
        assert_eq!(reading.goal, 10000.0);
        assert_eq!(reading.total, 4000.0);
    }

    #[test]
    fn test_percent_out_of_range_ignored() {
        let html = "<p>Goal: $10,000</p><p>250% funded</p>";
        let reading = extract(html);
        assert_eq!(reading.goal, 10000.0);
        // медиана: единственное долларовое число на странице
        assert_eq!(reading.total, 10000.0);
    }

    #[test]
    fn test_median_fallback() {
        // Ни "raised", ни goal-разметки: берётся средний элемент
        let html = "<p>Gift shop: $10</p><p>Campaign: $5,000</p><p>Major gift: $1,000,000</p>";
        assert_eq!(extract(html).total, 5000.0);
    }

    #[test]
    fn test_garbage_input_yields_zeroes() {
        for html in ["", "<<<>>>", "<html><body>no numbers here</body></html>"] {
            let reading = extract(html);
            assert_eq!(reading.total, 0.0);
            assert_eq!(reading.donors, 0.0);
            assert_eq!(reading.goal, 0.0);
            assert!(reading.error.is_none());
        }
    }

    #[test]
    fn test_fields_always_finite_and_non_negative() {
        let html = "<p>$1.2.3 raised</p><p>-$50 raised</p><p>9,9 donors</p>";
        let reading = extract(html);
        for n in [reading.total, reading.donors, reading.goal] {
            assert!(n.is_finite());
            assert!(n >= 0.0);
        }
    }

    #[test]
    fn test_extract_is_idempotent() {
        let html = "<p>$2,000 raised of $10,000 goal</p><p>42 donors</p>";
        let first = extract(html);
        let second = extract(html);
        assert_eq!(first.total, second.total);
        assert_eq!(first.donors, second.donors);
        assert_eq!(first.goal, second.goal);
    }

    #[test]
    fn test_script_contents_not_counted_as_visible_text() {
        let html = r#"<script>var x = "$999,999 raised";</script><p>$100 raised</p>"#;
        assert_eq!(extract(html).total, 100.0);
    }
}
