use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::watch_types::WatchError;

/// Canonical rendering of a calendar date in the reservation API.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Decoded response from the reservation-availability endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityPayload {
    /// Per-pass reservation records. A response without this key is
    /// well-formed JSON but unusable for evaluation.
    #[serde(default)]
    pub data: Option<Vec<PassRecord>>,
}

/// Opaque identifier of a reservation pass.
///
/// The site is inconsistent about whether ids come back as strings or
/// numbers; both are accepted and the id is never interpreted beyond its use
/// as a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PassId {
    /// String-shaped id, e.g. `"88A"`
    Text(String),
    /// Numeric id, e.g. `88`
    Number(i64),
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassId::Text(s) => f.write_str(s),
            PassId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One reservation-pass entry from the availability payload
#[derive(Debug, Clone, Deserialize)]
pub struct PassRecord {
    /// Pass identity; may be absent or null and still groups matches
    #[serde(default)]
    pub id: Option<PassId>,

    /// Remaining reservation slots on the pass; absent counts as zero.
    /// A pass with zero slots is ineligible regardless of its date lists.
    #[serde(default)]
    pub reservations_available: i64,

    /// Dates the resort is closed
    #[serde(default)]
    pub closed_dates: HashSet<String>,

    /// Blackout dates for this pass
    #[serde(default)]
    pub blackout_dates: HashSet<String>,

    /// Dates already fully booked
    #[serde(default)]
    pub unavailable_dates: HashSet<String>,
}

impl PassRecord {
    /// A date is reservable when none of the three exclusion lists mention
    /// it. Exact, case-sensitive string membership.
    fn is_reservable(&self, date: &str) -> bool {
        !self.closed_dates.contains(date)
            && !self.blackout_dates.contains(date)
            && !self.unavailable_dates.contains(date)
    }
}

/// Desired dates found reservable on a single pass during one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassAvailability {
    /// Identity of the pass the dates were found on
    pub pass_id: Option<PassId>,
    /// Matched dates, in desired-date order per record occurrence
    pub dates: Vec<NaiveDate>,
}

/// Result of one availability evaluation.
///
/// Entries appear in first-seen pass order; passes that contributed no dates
/// are never present. Built fresh every cycle and never merged with prior
/// cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityReport {
    entries: Vec<PassAvailability>,
}

impl AvailabilityReport {
    /// True when no pass matched any desired date
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Matched passes in insertion order
    pub fn entries(&self) -> &[PassAvailability] {
        &self.entries
    }

    /// Records one matched date. Repeated pass ids union into the existing
    /// entry instead of dropping dates.
    fn push(&mut self, pass_id: &Option<PassId>, date: NaiveDate) {
        match self.entries.iter_mut().find(|e| &e.pass_id == pass_id) {
            Some(entry) => entry.dates.push(date),
            None => self.entries.push(PassAvailability {
                pass_id: pass_id.clone(),
                dates: vec![date],
            }),
        }
    }
}

/// Evaluates one availability snapshot against the desired dates.
///
/// A record contributes a date iff its `reservations_available` is at least
/// one and the date is absent from all three exclusion lists. Desired dates
/// are checked in caller order, so the report is stable for a given
/// configuration. Pure: identical inputs always yield an identical report.
pub fn extract_availability(
    payload: &AvailabilityPayload,
    desired: &[NaiveDate],
) -> Result<AvailabilityReport, WatchError> {
    let records = payload.data.as_deref().ok_or_else(|| {
        WatchError::MalformedPayload("response has no top-level 'data' key".to_string())
    })?;

    let desired: Vec<(NaiveDate, String)> = desired
        .iter()
        .map(|d| (*d, d.format(DATE_FORMAT).to_string()))
        .collect();

    let mut report = AvailabilityReport::default();

    for record in records {
        if record.reservations_available < 1 {
            continue;
        }

        for (date, date_str) in &desired {
            if record.is_reservable(date_str) {
                report.push(&record.id, *date);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn decode(json: &str) -> AvailabilityPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_excluded_date_is_filtered_out() {
        let payload = decode(
            r#"{"data":[{"id":"88A","reservations_available":2,
                "closed_dates":["2025-03-01"],"blackout_dates":[],"unavailable_dates":[]}]}"#,
        );
        let desired = vec![date("2025-03-01"), date("2025-03-02")];

        let report = extract_availability(&payload, &desired).unwrap();

        assert_eq!(report.entries().len(), 1);
        let entry = &report.entries()[0];
        assert_eq!(entry.pass_id, Some(PassId::Text("88A".to_string())));
        assert_eq!(entry.dates, vec![date("2025-03-02")]);
    }

    #[test]
    fn test_zero_reservations_skips_pass_entirely() {
        let payload = decode(
            r#"{"data":[{"id":"X","reservations_available":0,
                "closed_dates":[],"blackout_dates":[],"unavailable_dates":[]}]}"#,
        );
        let desired = vec![date("2025-03-01"), date("2025-03-02")];

        let report = extract_availability(&payload, &desired).unwrap();

        assert!(report.is_empty());
    }

    #[test]
    fn test_missing_data_key_is_malformed() {
        let payload = decode(r#"{"meta":{"status":"ok"}}"#);

        let err = extract_availability(&payload, &[date("2025-03-01")]).unwrap_err();

        assert!(matches!(err, WatchError::MalformedPayload(_)));
    }

    #[test]
    fn test_only_desired_dates_ever_surface() {
        // The record would accept any date; the report must still be capped
        // at what was asked for.
        let payload = decode(r#"{"data":[{"id":1,"reservations_available":5}]}"#);
        let desired = vec![date("2025-12-24"), date("2025-12-25")];

        let report = extract_availability(&payload, &desired).unwrap();

        assert_eq!(report.entries().len(), 1);
        assert_eq!(report.entries()[0].dates, desired);
    }

    #[test]
    fn test_all_three_exclusion_lists_apply() {
        let payload = decode(
            r#"{"data":[{"id":"s","reservations_available":1,
                "closed_dates":["2025-01-01"],
                "blackout_dates":["2025-01-02"],
                "unavailable_dates":["2025-01-03"]}]}"#,
        );
        let desired = vec![
            date("2025-01-01"),
            date("2025-01-02"),
            date("2025-01-03"),
            date("2025-01-04"),
        ];

        let report = extract_availability(&payload, &desired).unwrap();

        assert_eq!(report.entries()[0].dates, vec![date("2025-01-04")]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let payload = decode(
            r#"{"data":[
                {"id":"a","reservations_available":1,"blackout_dates":["2025-02-02"]},
                {"id":"b","reservations_available":3}]}"#,
        );
        let desired = vec![date("2025-02-01"), date("2025-02-02")];

        let first = extract_availability(&payload, &desired).unwrap();
        let second = extract_availability(&payload, &desired).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_pass_ids_union_into_one_entry() {
        let payload = decode(
            r#"{"data":[
                {"id":7,"reservations_available":1,"closed_dates":["2025-03-02"]},
                {"id":7,"reservations_available":1,"closed_dates":["2025-03-01"]}]}"#,
        );
        let desired = vec![date("2025-03-01"), date("2025-03-02")];

        let report = extract_availability(&payload, &desired).unwrap();

        assert_eq!(report.entries().len(), 1);
        assert_eq!(
            report.entries()[0].dates,
            vec![date("2025-03-01"), date("2025-03-02")]
        );
    }

    #[test]
    fn test_absent_and_null_ids_still_group() {
        let payload = decode(
            r#"{"data":[
                {"reservations_available":1},
                {"id":null,"reservations_available":1}]}"#,
        );
        let desired = vec![date("2025-03-01")];

        let report = extract_availability(&payload, &desired).unwrap();

        assert_eq!(report.entries().len(), 1);
        assert_eq!(report.entries()[0].pass_id, None);
        assert_eq!(
            report.entries()[0].dates,
            vec![date("2025-03-01"), date("2025-03-01")]
        );
    }

    #[test]
    fn test_pass_with_no_matches_is_omitted() {
        let payload = decode(
            r#"{"data":[
                {"id":"full","reservations_available":2,"unavailable_dates":["2025-03-01"]},
                {"id":"open","reservations_available":2}]}"#,
        );
        let desired = vec![date("2025-03-01")];

        let report = extract_availability(&payload, &desired).unwrap();

        assert_eq!(report.entries().len(), 1);
        assert_eq!(
            report.entries()[0].pass_id,
            Some(PassId::Text("open".to_string()))
        );
    }

    #[test]
    fn test_numeric_and_string_ids_render() {
        assert_eq!(PassId::Text("88A".to_string()).to_string(), "88A");
        assert_eq!(PassId::Number(88).to_string(), "88");
    }

    #[test]
    fn test_missing_reservation_count_defaults_to_zero() {
        let payload = decode(r#"{"data":[{"id":"q"}]}"#);

        let report = extract_availability(&payload, &[date("2025-03-01")]).unwrap();

        assert!(report.is_empty());
    }
}
