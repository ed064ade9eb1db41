// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned report envelopes and the stored shape of a channel queue.
//!
//! A [`Report`] is immutable once enqueued. Every report carries a random
//! `id` so the engine can prune exactly the entries it delivered, even when
//! two reports share the same content. The one exception is the URL-usage
//! snapshot, whose counters keep growing in place until it is delivered.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DialtoneError;

/// Format version of feedback reports.
pub const FEEDBACK_REPORT_VERSION: u32 = 1;

/// Format version of URL-usage reports.
pub const URL_USAGE_REPORT_VERSION: u32 = 1;

/// Static identifying metadata stamped on every report at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeInfo {
    pub reason: String,
    pub app_name: String,
    pub app_version: String,
    pub update_channel: String,
    pub build_id: String,
}

/// User feedback: a happy/sad verdict with an optional free-text description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPayload {
    pub happy: bool,
    pub description: String,
    pub url: Option<String>,
}

/// Running counters of generated and shared call URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlUsagePayload {
    pub generated_urls: u64,
    pub shared_urls: u64,
}

/// Kind-specific report body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportPayload {
    Feedback(FeedbackPayload),
    UrlUsage(UrlUsagePayload),
}

/// A single report as persisted and as posted to the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub version: u32,
    pub envelope_info: EnvelopeInfo,
    pub payload: ReportPayload,
}

impl Report {
    /// Create a report with a fresh id.
    pub fn new(version: u32, envelope_info: EnvelopeInfo, payload: ReportPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            version,
            envelope_info,
            payload,
        }
    }

    /// Create a version-1 feedback report.
    pub fn feedback(envelope_info: EnvelopeInfo, payload: FeedbackPayload) -> Self {
        Self::new(
            FEEDBACK_REPORT_VERSION,
            envelope_info,
            ReportPayload::Feedback(payload),
        )
    }

    /// Create a zeroed URL-usage snapshot.
    pub fn url_usage(envelope_info: EnvelopeInfo) -> Self {
        Self::new(
            URL_USAGE_REPORT_VERSION,
            envelope_info,
            ReportPayload::UrlUsage(UrlUsagePayload::default()),
        )
    }

    /// What is still owed once `delivered` reached the collector.
    fn remaining_after(self, delivered: &[Report]) -> Option<Self> {
        if delivered.contains(&self) {
            return None;
        }
        let Some(sent) = delivered.iter().find(|d| d.id == self.id) else {
            return Some(self);
        };
        match (&self.payload, &sent.payload) {
            (ReportPayload::UrlUsage(now), ReportPayload::UrlUsage(then)) => {
                let delta = UrlUsagePayload {
                    generated_urls: now.generated_urls.saturating_sub(then.generated_urls),
                    shared_urls: now.shared_urls.saturating_sub(then.shared_urls),
                };
                if delta == UrlUsagePayload::default() {
                    return None;
                }
                Some(Self::new(self.version, self.envelope_info, ReportPayload::UrlUsage(delta)))
            }
            _ => Some(self),
        }
    }
}

/// Content of one category key in the store.
///
/// The store holds either a single report object, a list of reports, or an
/// empty object marking an explicit clear. A missing key is represented by
/// `Option::None` at the call sites, not by a variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSet {
    /// Explicitly cleared (`{}` in the store).
    Cleared,
    /// A single current-state snapshot.
    Single(Report),
    /// An append-only queue in send order.
    List(Vec<Report>),
}

impl ReportSet {
    /// Normalize to a list in send order.
    pub fn into_reports(self) -> Vec<Report> {
        match self {
            Self::Cleared => Vec::new(),
            Self::Single(report) => vec![report],
            Self::List(reports) => reports,
        }
    }

    /// Number of reports held.
    pub fn len(&self) -> usize {
        match self {
            Self::Cleared => 0,
            Self::Single(_) => 1,
            Self::List(reports) => reports.len(),
        }
    }

    /// Returns `true` when no report is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every report equal to one of `delivered`, keeping the shape.
    ///
    /// A URL-usage snapshot that was bumped after it went out shares its id
    /// with the delivered copy but not its counts. Only the delta survives,
    /// under a fresh id. A single snapshot that was removed collapses to an
    /// empty list so the next read reports "nothing pending" rather than
    /// "cleared".
    pub fn without(self, delivered: &[Report]) -> Self {
        match self {
            Self::Cleared => Self::Cleared,
            Self::Single(report) => match report.remaining_after(delivered) {
                Some(report) => Self::Single(report),
                None => Self::List(Vec::new()),
            },
            Self::List(reports) => Self::List(
                reports
                    .into_iter()
                    .filter_map(|r| r.remaining_after(delivered))
                    .collect(),
            ),
        }
    }

    /// Encode into the opaque store representation.
    pub fn to_value(&self) -> Result<Value, DialtoneError> {
        Ok(match self {
            Self::Cleared => Value::Object(serde_json::Map::new()),
            Self::Single(report) => serde_json::to_value(report)?,
            Self::List(reports) => serde_json::to_value(reports)?,
        })
    }

    /// Decode from the opaque store representation.
    pub fn from_value(value: Value) -> Result<Self, DialtoneError> {
        match value {
            Value::Array(_) => Ok(Self::List(serde_json::from_value(value)?)),
            Value::Object(ref map) if map.is_empty() => Ok(Self::Cleared),
            Value::Object(_) => Ok(Self::Single(serde_json::from_value(value)?)),
            other => Err(DialtoneError::Internal(format!(
                "unexpected stored report shape: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> EnvelopeInfo {
        EnvelopeInfo {
            reason: "feedback".into(),
            app_name: "dialtone".into(),
            app_version: "1.0.0".into(),
            update_channel: "release".into(),
            build_id: "20260101000000".into(),
        }
    }

    fn feedback(description: &str) -> Report {
        Report::feedback(
            envelope(),
            FeedbackPayload {
                happy: true,
                description: description.into(),
                url: None,
            },
        )
    }

    #[test]
    fn report_serializes_with_camel_case_fields() {
        let report = Report::url_usage(envelope());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["envelopeInfo"]["appName"], "dialtone");
        assert_eq!(json["envelopeInfo"]["updateChannel"], "release");
        assert_eq!(json["payload"]["generatedUrls"], 0);
        assert_eq!(json["payload"]["sharedUrls"], 0);
        assert_eq!(json["version"], 1);
    }

    #[test]
    fn untagged_payload_picks_the_right_kind() {
        let report = feedback("great call");
        let json = serde_json::to_value(&report).unwrap();
        let back: Report = serde_json::from_value(json).unwrap();
        assert!(matches!(back.payload, ReportPayload::Feedback(ref p) if p.description == "great call"));

        let usage = Report::url_usage(envelope());
        let back: Report = serde_json::from_value(serde_json::to_value(&usage).unwrap()).unwrap();
        assert!(matches!(back.payload, ReportPayload::UrlUsage(_)));
    }

    #[test]
    fn stored_shapes_decode() {
        let empty = ReportSet::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty, ReportSet::Cleared);

        let one = feedback("a");
        let single = ReportSet::from_value(serde_json::to_value(&one).unwrap()).unwrap();
        assert_eq!(single, ReportSet::Single(one.clone()));

        let list = ReportSet::from_value(serde_json::to_value(vec![one.clone()]).unwrap()).unwrap();
        assert_eq!(list, ReportSet::List(vec![one]));

        assert!(ReportSet::from_value(serde_json::json!(42)).is_err());
    }

    #[test]
    fn cleared_encodes_as_empty_object() {
        let value = ReportSet::Cleared.to_value().unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn without_removes_by_identity_not_content() {
        let a = feedback("same");
        let b = feedback("same");
        let set = ReportSet::List(vec![a.clone(), b.clone()]);
        let pruned = set.without(std::slice::from_ref(&a));
        assert_eq!(pruned, ReportSet::List(vec![b]));
    }

    fn usage(report: &Report, generated_urls: u64, shared_urls: u64) -> Report {
        let mut bumped = report.clone();
        bumped.payload = ReportPayload::UrlUsage(UrlUsagePayload {
            generated_urls,
            shared_urls,
        });
        bumped
    }

    #[test]
    fn without_keeps_only_the_delta_of_a_bumped_snapshot() {
        let base = Report::url_usage(envelope());
        let sent = usage(&base, 2, 1);
        let current = usage(&base, 3, 1);

        let rest = match ReportSet::Single(current).without(std::slice::from_ref(&sent)) {
            ReportSet::Single(rest) => rest,
            other => panic!("expected a remaining snapshot, got {other:?}"),
        };
        assert_ne!(rest.id, sent.id);
        assert_eq!(rest.version, sent.version);
        assert_eq!(rest.envelope_info, sent.envelope_info);
        assert_eq!(
            rest.payload,
            ReportPayload::UrlUsage(UrlUsagePayload {
                generated_urls: 1,
                shared_urls: 0,
            })
        );
    }

    #[test]
    fn without_drops_a_snapshot_with_nothing_new() {
        let base = Report::url_usage(envelope());
        let sent = usage(&base, 2, 0);
        let pruned = ReportSet::List(vec![usage(&base, 1, 0)]).without(&[sent]);
        assert_eq!(pruned, ReportSet::List(Vec::new()));
    }

    #[test]
    fn without_leaves_unrelated_snapshots_alone() {
        let sent = usage(&Report::url_usage(envelope()), 1, 0);
        let other = usage(&Report::url_usage(envelope()), 4, 4);
        let pruned = ReportSet::Single(other.clone()).without(&[sent]);
        assert_eq!(pruned, ReportSet::Single(other));
    }

    #[test]
    fn into_reports_normalizes_every_shape() {
        assert!(ReportSet::Cleared.into_reports().is_empty());
        assert_eq!(ReportSet::Single(feedback("x")).into_reports().len(), 1);
        assert_eq!(
            ReportSet::List(vec![feedback("x"), feedback("y")]).into_reports().len(),
            2
        );
    }
}
