//! Core journey types for milelog.
//!
//! A [`JourneyDraft`] is the single in-progress journey being recorded.
//! Once the draft reaches the final step it is frozen into a
//! [`JourneyRecord`], which is what the store persists.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a stored journey.
///
/// Derived from wall-clock milliseconds at commit time, bumped past the
/// newest stored id so ids stay strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JourneyId(pub i64);

impl JourneyId {
    /// Pick the id for a new record.
    #[must_use]
    pub fn next(now_millis: i64, newest: Option<JourneyId>) -> Self {
        match newest {
            Some(JourneyId(prev)) if now_millis <= prev => Self(prev.saturating_add(1)),
            _ => Self(now_millis),
        }
    }
}

impl std::fmt::Display for JourneyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse an odometer reading.
///
/// Accepts surrounding whitespace and a run of ASCII digits only.
///
/// # Errors
///
/// Returns [`Error::ValidationFailed`] naming `field` when the text is
/// empty or not a non-negative integer.
pub fn parse_mileage(field: &'static str, text: &str) -> Result<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::ValidationFailed { field });
    }
    trimmed
        .parse()
        .map_err(|_| Error::ValidationFailed { field })
}

/// Whether a free-text field counts as filled in.
#[must_use]
pub fn is_filled(text: &str) -> bool {
    !text.trim().is_empty()
}

/// The journey currently being recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JourneyDraft {
    date: String,
    purpose: String,
    start_location: String,
    end_location: String,
    start_mileage: String,
    end_mileage: String,
    total_distance: i64,
}

impl JourneyDraft {
    /// Begin a fresh draft dated `date`, with every other field empty.
    #[must_use]
    pub fn started_on(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    /// The journey date, fixed at start.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// The purpose as typed.
    #[must_use]
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// The start location label.
    #[must_use]
    pub fn start_location(&self) -> &str {
        &self.start_location
    }

    /// The end location label.
    #[must_use]
    pub fn end_location(&self) -> &str {
        &self.end_location
    }

    /// The start odometer reading as typed.
    #[must_use]
    pub fn start_mileage(&self) -> &str {
        &self.start_mileage
    }

    /// The end odometer reading as typed.
    #[must_use]
    pub fn end_mileage(&self) -> &str {
        &self.end_mileage
    }

    /// Distance from the last pair of readings that both parsed, 0 before that.
    #[must_use]
    pub fn total_distance(&self) -> i64 {
        self.total_distance
    }

    /// Whether this draft holds nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn set_purpose(&mut self, purpose: impl Into<String>) {
        self.purpose = purpose.into();
    }

    pub(crate) fn set_start_location(&mut self, label: impl Into<String>) {
        self.start_location = label.into();
    }

    pub(crate) fn set_end_location(&mut self, label: impl Into<String>) {
        self.end_location = label.into();
    }

    pub(crate) fn set_start_mileage(&mut self, reading: impl Into<String>) {
        self.start_mileage = reading.into();
        self.recompute_distance();
    }

    pub(crate) fn set_end_mileage(&mut self, reading: impl Into<String>) {
        self.end_mileage = reading.into();
        self.recompute_distance();
    }

    fn recompute_distance(&mut self) {
        if let (Ok(start), Ok(end)) = (
            parse_mileage("start mileage", &self.start_mileage),
            parse_mileage("end mileage", &self.end_mileage),
        ) {
            self.total_distance = end - start;
        }
    }

    /// Freeze the draft into a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] for the first required field
    /// that is missing or malformed.
    pub fn to_record(&self, id: JourneyId) -> Result<JourneyRecord> {
        for (field, value) in [
            ("date", &self.date),
            ("start location", &self.start_location),
            ("purpose", &self.purpose),
            ("end location", &self.end_location),
        ] {
            if !is_filled(value) {
                return Err(Error::ValidationFailed { field });
            }
        }
        let start = parse_mileage("start mileage", &self.start_mileage)?;
        let end = parse_mileage("end mileage", &self.end_mileage)?;

        Ok(JourneyRecord {
            id,
            date: self.date.clone(),
            purpose: self.purpose.clone(),
            start_location: self.start_location.clone(),
            end_location: self.end_location.clone(),
            start_mileage: self.start_mileage.clone(),
            end_mileage: self.end_mileage.clone(),
            total_distance: end - start,
        })
    }
}

/// A completed journey as persisted.
///
/// Serialized in camelCase; the location fields keep their legacy
/// `startPostcode`/`endPostcode` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyRecord {
    /// Unique identifier.
    pub id: JourneyId,
    /// Journey date.
    pub date: String,
    /// Business purpose.
    pub purpose: String,
    /// Start location label.
    #[serde(rename = "startPostcode")]
    pub start_location: String,
    /// End location label.
    #[serde(rename = "endPostcode")]
    pub end_location: String,
    /// Start odometer reading as typed.
    pub start_mileage: String,
    /// End odometer reading as typed.
    pub end_mileage: String,
    /// `end_mileage - start_mileage`.
    pub total_distance: i64,
}

/// A borrowed view over either a draft or a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyView<'a> {
    /// Journey date.
    pub date: &'a str,
    /// Business purpose.
    pub purpose: &'a str,
    /// Start location label.
    pub start_location: &'a str,
    /// End location label.
    pub end_location: &'a str,
    /// Start odometer reading.
    pub start_mileage: &'a str,
    /// End odometer reading.
    pub end_mileage: &'a str,
    /// Distance travelled.
    pub total_distance: i64,
}

impl<'a> From<&'a JourneyDraft> for JourneyView<'a> {
    fn from(draft: &'a JourneyDraft) -> Self {
        Self {
            date: &draft.date,
            purpose: &draft.purpose,
            start_location: &draft.start_location,
            end_location: &draft.end_location,
            start_mileage: &draft.start_mileage,
            end_mileage: &draft.end_mileage,
            total_distance: draft.total_distance,
        }
    }
}

impl<'a> From<&'a JourneyRecord> for JourneyView<'a> {
    fn from(record: &'a JourneyRecord) -> Self {
        Self {
            date: &record.date,
            purpose: &record.purpose,
            start_location: &record.start_location,
            end_location: &record.end_location,
            start_mileage: &record.start_mileage,
            end_mileage: &record.end_mileage,
            total_distance: record.total_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filled_draft() -> JourneyDraft {
        let mut draft = JourneyDraft::started_on("1/1/2024");
        draft.set_start_location("SW1A 1AA");
        draft.set_purpose("Client visit");
        draft.set_start_mileage("1000");
        draft.set_end_location("EC1A 1BB");
        draft.set_end_mileage("1050");
        draft
    }

    #[test]
    fn test_journey_id_uses_clock() {
        assert_eq!(JourneyId::next(500, None), JourneyId(500));
        assert_eq!(JourneyId::next(500, Some(JourneyId(400))), JourneyId(500));
    }

    #[test]
    fn test_journey_id_stays_monotonic() {
        assert_eq!(JourneyId::next(500, Some(JourneyId(500))), JourneyId(501));
        assert_eq!(JourneyId::next(100, Some(JourneyId(900))), JourneyId(901));
    }

    #[test]
    fn test_parse_mileage() {
        assert_eq!(parse_mileage("m", "1000").unwrap(), 1000);
        assert_eq!(parse_mileage("m", " 42 ").unwrap(), 42);
        assert!(parse_mileage("m", "").unwrap_err().is_validation());
        assert!(parse_mileage("m", "   ").is_err());
        assert!(parse_mileage("m", "-5").is_err());
        assert!(parse_mileage("m", "12a").is_err());
        assert!(parse_mileage("m", "1.5").is_err());
    }

    #[test]
    fn test_is_filled() {
        assert!(is_filled("x"));
        assert!(is_filled("  x "));
        assert!(!is_filled(""));
        assert!(!is_filled(" \t\n"));
    }

    #[test]
    fn test_started_on_clears_fields() {
        let draft = JourneyDraft::started_on("2/3/2024");
        assert_eq!(draft.date(), "2/3/2024");
        assert!(draft.purpose().is_empty());
        assert!(draft.start_location().is_empty());
        assert_eq!(draft.total_distance(), 0);
        assert!(!draft.is_empty());
        assert!(JourneyDraft::default().is_empty());
    }

    #[test]
    fn test_distance_previews_once_both_readings_set() {
        let mut draft = JourneyDraft::started_on("1/1/2024");
        draft.set_start_mileage("1000");
        assert_eq!(draft.total_distance(), 0);

        draft.set_end_mileage("1050");
        assert_eq!(draft.total_distance(), 50);

        draft.set_end_mileage("990");
        assert_eq!(draft.total_distance(), -10);
    }

    #[test]
    fn test_to_record() {
        let record = filled_draft().to_record(JourneyId(7)).unwrap();
        assert_eq!(record.id, JourneyId(7));
        assert_eq!(record.start_location, "SW1A 1AA");
        assert_eq!(record.end_mileage, "1050");
        assert_eq!(record.total_distance, 50);
    }

    #[test]
    fn test_to_record_rejects_missing_field() {
        let mut draft = filled_draft();
        draft.set_purpose("   ");
        let err = draft.to_record(JourneyId(1)).unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { field: "purpose" }));
    }

    #[test]
    fn test_purpose_keeps_raw_value() {
        let mut draft = filled_draft();
        draft.set_purpose("  Site survey  ");
        let record = draft.to_record(JourneyId(1)).unwrap();
        assert_eq!(record.purpose, "  Site survey  ");
    }

    #[test]
    fn test_record_wire_format() {
        let record = filled_draft().to_record(JourneyId(1_704_067_200_000)).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], 1_704_067_200_000_i64);
        assert_eq!(json["startPostcode"], "SW1A 1AA");
        assert_eq!(json["endPostcode"], "EC1A 1BB");
        assert_eq!(json["startMileage"], "1000");
        assert_eq!(json["endMileage"], "1050");
        assert_eq!(json["totalDistance"], 50);
        assert_eq!(json.as_object().unwrap().len(), 8);
    }

    #[test]
    fn test_record_reads_camel_case_layout() {
        let json = r#"{"id":1704067200000,"date":"1/1/2024","purpose":"Client visit",
            "startPostcode":"SW1A 1AA","endPostcode":"EC1A 1BB",
            "startMileage":"1000","endMileage":"1050","totalDistance":50}"#;
        let record: JourneyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, JourneyId(1_704_067_200_000));
        assert_eq!(record.purpose, "Client visit");
    }

    #[test]
    fn test_view_from_draft_and_record() {
        let draft = filled_draft();
        let record = draft.to_record(JourneyId(1)).unwrap();
        assert_eq!(JourneyView::from(&draft), JourneyView::from(&record));
    }

    proptest! {
        #[test]
        fn prop_distance_is_end_minus_start(start in 0i64..10_000_000, end in 0i64..10_000_000) {
            let mut draft = filled_draft();
            draft.set_start_mileage(start.to_string());
            draft.set_end_mileage(end.to_string());
            prop_assert_eq!(draft.total_distance(), end - start);

            let record = draft.to_record(JourneyId(1)).unwrap();
            prop_assert_eq!(record.total_distance, end - start);
        }
    }
}
