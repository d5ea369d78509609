use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A post as fetched from the content service.
///
/// The service is loosely typed: ids may arrive as numbers, `tags` and
/// `categories` may arrive as comma-separated strings, and `date` may be an
/// epoch number or one of several string formats. All of that is normalized
/// here, at deserialization, so no index builder ever re-derives field shape.
/// Once fetched, a post is immutable for the duration of a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub top: bool,
    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Content fields this engine does not interpret, passed through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    /// Calendar year (UTC) of the post's date, if it has one.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Num(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => String::new(),
        Some(Raw::Text(s)) => s,
        Some(Raw::Num(n)) => n.to_string(),
    })
}

fn deserialize_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Raw::One(s)) => split_labels(&s),
        Some(Raw::Many(v)) => v,
    })
}

/// Splits a comma-separated label string, dropping empty fragments.
fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(String::from)
        .collect()
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }

    // An unparseable date degrades to "no date"; the post is then simply
    // excluded from the archive index rather than failing the build.
    Ok(Option::<Raw>::deserialize(deserializer)?.and_then(|raw| match raw {
        Raw::Num(n) => parse_epoch(n),
        Raw::Text(s) => parse_date_str(&s),
    }))
}

fn parse_epoch(n: i64) -> Option<DateTime<Utc>> {
    // 13-digit epoch values are milliseconds
    if n.abs() >= 100_000_000_000 {
        Utc.timestamp_millis_opt(n).single()
    } else {
        Utc.timestamp_opt(n, 0).single()
    }
}

fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(value: serde_json::Value) -> Post {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tags_from_comma_separated_string() {
        let p = post(json!({"id": "1", "tags": "rust, web,tools"}));
        assert_eq!(p.tags, vec!["rust", "web", "tools"]);
    }

    #[test]
    fn test_tags_from_list() {
        let p = post(json!({"id": "1", "tags": ["rust", "web"]}));
        assert_eq!(p.tags, vec!["rust", "web"]);
    }

    #[test]
    fn test_tags_absent_is_empty() {
        let p = post(json!({"id": "1"}));
        assert!(p.tags.is_empty());
        assert!(p.categories.is_empty());
    }

    #[test]
    fn test_trailing_comma_drops_empty_label() {
        let p = post(json!({"id": "1", "tags": "a, b,"}));
        assert_eq!(p.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_numeric_id_normalized_to_string() {
        let p = post(json!({"id": 42, "title": "t"}));
        assert_eq!(p.id, "42");
    }

    #[test]
    fn test_date_rfc3339() {
        let p = post(json!({"id": "1", "date": "2023-01-01T12:30:00Z"}));
        assert_eq!(p.year(), Some(2023));
    }

    #[test]
    fn test_date_plain_day() {
        let p = post(json!({"id": "1", "date": "2023-01-01"}));
        assert_eq!(p.year(), Some(2023));
    }

    #[test]
    fn test_date_datetime_without_zone() {
        let p = post(json!({"id": "1", "date": "2024-06-01 08:15:00"}));
        assert_eq!(p.year(), Some(2024));
    }

    #[test]
    fn test_date_epoch_seconds_and_millis() {
        let secs = post(json!({"id": "1", "date": 1_700_000_000}));
        let millis = post(json!({"id": "2", "date": 1_700_000_000_000i64}));
        assert_eq!(secs.date, millis.date);
        assert_eq!(secs.year(), Some(2023));
    }

    #[test]
    fn test_malformed_date_degrades_to_none() {
        let p = post(json!({"id": "1", "date": "next tuesday"}));
        assert!(p.date.is_none());
    }

    #[test]
    fn test_top_defaults_to_false() {
        let p = post(json!({"id": "1"}));
        assert!(!p.top);
        let pinned = post(json!({"id": "1", "top": true}));
        assert!(pinned.top);
    }

    #[test]
    fn test_summary_aliases_description() {
        let p = post(json!({"id": "1", "description": "short"}));
        assert_eq!(p.summary.as_deref(), Some("short"));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let p = post(json!({"id": "1", "content": "# body", "cover": "x.png"}));
        assert_eq!(p.extra["content"], json!("# body"));
        assert_eq!(p.extra["cover"], json!("x.png"));
    }
}
