//! Human-readable status line for a notice.
//!
//! The phase of a notice is derived from the wall clock at render time, so the
//! same stored record yields different text before, during and after it.

use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::models::notice::{NoticeKind, NoticeRecord};

/// When a notice with an `end` counts as concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcludedRule {
    /// `end < now`
    #[default]
    EndPassed,
    /// `end > now`. Inverted reading kept selectable for deployments that relied on it.
    EndPending,
}

impl ConcludedRule {
    fn holds(self, end: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            ConcludedRule::EndPassed => end < now,
            ConcludedRule::EndPending => end > now,
        }
    }
}

impl FromStr for ConcludedRule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "end_passed" => Ok(ConcludedRule::EndPassed),
            "end_pending" => Ok(ConcludedRule::EndPending),
            other => Err(anyhow::anyhow!(
                "Unknown concluded rule {other:?} (expected end_passed or end_pending)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WillOccur,
    Ongoing,
    Concluded,
}

impl Phase {
    pub fn of(record: &NoticeRecord, now: NaiveDateTime, rule: ConcludedRule) -> Self {
        if now < record.begin {
            return Phase::WillOccur;
        }
        match record.end {
            None => Phase::Ongoing,
            Some(end) if rule.holds(end, now) => Phase::Concluded,
            // An end is scheduled but not reached yet.
            Some(_) => Phase::Ongoing,
        }
    }
}

fn noun(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Maintenance => "メンテナンス",
        NoticeKind::Event => "障害",
    }
}

fn verb(kind: NoticeKind, phase: Phase) -> &'static str {
    match (kind, phase) {
        (NoticeKind::Maintenance, Phase::WillOccur) => "メンテナンスを行います",
        (NoticeKind::Maintenance, Phase::Ongoing) => "メンテナンスを行っています",
        (NoticeKind::Maintenance, Phase::Concluded) => "メンテナンスを行いました",
        (NoticeKind::Event, Phase::WillOccur) => "",
        (NoticeKind::Event, Phase::Ongoing) => "障害が発生しています",
        (NoticeKind::Event, Phase::Concluded) => "障害が発生しました",
    }
}

/// Link to the public detail page of notice `id`.
pub fn detail_uri(base_uri: &str, id: i64) -> String {
    format!("{base_uri}detail/{id}")
}

pub fn format_status(
    record: &NoticeRecord,
    now: NaiveDateTime,
    base_uri: &str,
    rule: ConcludedRule,
) -> String {
    let phase = Phase::of(record, now, rule);
    let (end, connector) = match record.end {
        Some(end) => (end.format("%Y-%m-%d %H:%M:%S").to_string(), "の間に"),
        None => (String::new(), ""),
    };

    format!(
        "【{}】{}〜{}{}、{}. 影響サービス:{} 詳細:{}",
        noun(record.kind),
        record.begin.format("%Y-%m-%d %H:%M:%S"),
        end,
        connector,
        verb(record.kind, phase),
        record.service,
        detail_uri(base_uri, record.id),
    )
}
