use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

/// Rendering used for timestamps in API responses.
pub const API_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Formats accepted for `begin` / `end` form fields, tried in order.
const INPUT_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum NoticeKind {
    Maintenance,
    Event,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Maintenance => "maintenance",
            NoticeKind::Event => "event",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoticeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maintenance" => Ok(NoticeKind::Maintenance),
            "event" => Ok(NoticeKind::Event),
            _ => Err(anyhow::anyhow!("Unknown notice type: {s}")),
        }
    }
}

/// One row of `fault_info_log`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct NoticeRecord {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NoticeKind,
    pub service: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub begin: NaiveDateTime,
    #[serde(serialize_with = "serialize_optional_timestamp")]
    pub end: Option<NaiveDateTime>,
    pub detail: String,
}

/// Validated fields for a new notice; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewNotice {
    pub kind: NoticeKind,
    pub service: String,
    pub begin: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub detail: String,
}

impl NewNotice {
    pub fn into_record(self, id: i64) -> NoticeRecord {
        NoticeRecord {
            id,
            kind: self.kind,
            service: self.service,
            begin: self.begin,
            end: self.end,
            detail: self.detail,
        }
    }
}

/// Partial replacement of a notice. Only present fields are written.
#[derive(Debug, Clone, Default)]
pub struct NoticePatch {
    pub kind: Option<NoticeKind>,
    pub service: Option<String>,
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub detail: Option<String>,
}

impl NoticePatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.service.is_none()
            && self.begin.is_none()
            && self.end.is_none()
            && self.detail.is_none()
    }
}

/// Form body for POST /
#[derive(Debug, Default, Deserialize)]
pub struct CreateNoticeForm {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub service: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub detail: Option<String>,
    pub apikey: Option<String>,
}

/// Form body for PUT /{id}
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoticeForm {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub service: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub detail: Option<String>,
    pub apikey: Option<String>,
    pub tweet: Option<String>,
}

/// Query params for GET /
#[derive(Debug, Default, Deserialize)]
pub struct ReadNoticeQuery {
    pub all: Option<String>,
    pub issue: Option<String>,
}

/// Flag values understood as "on" for `all`.
pub fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "True" | "true"))
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    INPUT_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(API_TIMESTAMP_FORMAT))
}

fn serialize_optional_timestamp<S: Serializer>(
    ts: &Option<NaiveDateTime>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serialize_timestamp(ts, s),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn record_serializes_with_slash_timestamps() {
        let record = NoticeRecord {
            id: 7,
            kind: NoticeKind::Maintenance,
            service: "mail".into(),
            begin: at(2024, 3, 1, 9, 5, 0),
            end: None,
            detail: String::new(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "type": "maintenance",
                "service": "mail",
                "begin": "2024/03/01 09:05:00",
                "end": null,
                "detail": ""
            })
        );
    }

    #[test]
    fn parses_accepted_timestamp_formats() {
        let expected = at(2024, 3, 1, 9, 5, 0);
        assert_eq!(parse_timestamp("2024-03-01 09:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024/03/01 09:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T09:05:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2024-03-01 09:05 "), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn kind_parses_only_known_values() {
        assert_eq!("event".parse::<NoticeKind>().unwrap(), NoticeKind::Event);
        assert_eq!(
            "maintenance".parse::<NoticeKind>().unwrap(),
            NoticeKind::Maintenance
        );
        assert!("Event".parse::<NoticeKind>().is_err());
        assert!("outage".parse::<NoticeKind>().is_err());
    }

    #[test]
    fn truthy_flags() {
        assert!(is_truthy(Some("1")));
        assert!(is_truthy(Some("true")));
        assert!(is_truthy(Some("True")));
        assert!(!is_truthy(Some("0")));
        assert!(!is_truthy(Some("yes")));
        assert!(!is_truthy(None));
    }

    #[test]
    fn empty_patch() {
        assert!(NoticePatch::default().is_empty());
        let patch = NoticePatch {
            detail: Some(String::new()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
