//! Plain-text journey exports.
//!
//! Two variants exist and downstream consumers rely on both. The share text
//! (clipboard, messaging) uses short `Start`/`End` labels and is normalized.
//! The file text uses `Start Location`/`End Location` and is written as-is.

mod sink;

use std::sync::OnceLock;

use regex::Regex;

use crate::journey::JourneyView;

pub use sink::{ClipboardSink, FileSink, ShareChain, ShareOutcome, ShareSink, SHARE_FAILED_NOTICE};

/// Heading of every export.
pub const EXPORT_TITLE: &str = "Business Journey Log";

/// Which text layout to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportVariant {
    /// Clipboard and share text.
    Share,
    /// Downloaded `.txt` file.
    File,
}

impl ExportVariant {
    /// Render `journey` in this variant.
    #[must_use]
    pub fn render<'a>(self, journey: impl Into<JourneyView<'a>>) -> String {
        match self {
            Self::Share => format_share(journey),
            Self::File => format_file(journey),
        }
    }
}

fn blank_lines() -> &'static Regex {
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    BLANK_LINES.get_or_init(|| Regex::new(r"\n{2,}").expect("static regex is valid"))
}

fn labelled(journey: &JourneyView<'_>, start_label: &str, end_label: &str) -> String {
    format!(
        "{EXPORT_TITLE}\n\
         Date: {}\n\
         Purpose: {}\n\
         {start_label}: {}\n\
         {end_label}: {}\n\
         Start Mileage: {}\n\
         End Mileage: {}\n\
         Total Distance: {} miles",
        journey.date,
        journey.purpose,
        journey.start_location,
        journey.end_location,
        journey.start_mileage,
        journey.end_mileage,
        journey.total_distance,
    )
}

/// Share text: CRLF folded to LF, blank-line runs collapsed, trimmed.
#[must_use]
pub fn format_share<'a>(journey: impl Into<JourneyView<'a>>) -> String {
    let text = labelled(&journey.into(), "Start", "End").replace("\r\n", "\n");
    blank_lines().replace_all(&text, "\n").trim().to_string()
}

/// File text, unnormalized.
#[must_use]
pub fn format_file<'a>(journey: impl Into<JourneyView<'a>>) -> String {
    labelled(&journey.into(), "Start Location", "End Location")
}

/// `journey-<date>.txt` using the raw date string.
#[must_use]
pub fn file_name<'a>(journey: impl Into<JourneyView<'a>>) -> String {
    format!("journey-{}.txt", journey.into().date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::{JourneyId, JourneyRecord};

    fn example_record() -> JourneyRecord {
        JourneyRecord {
            id: JourneyId(1),
            date: "1/1/2024".to_string(),
            purpose: "Client visit".to_string(),
            start_location: "SW1A 1AA".to_string(),
            end_location: "EC1A 1BB".to_string(),
            start_mileage: "1000".to_string(),
            end_mileage: "1050".to_string(),
            total_distance: 50,
        }
    }

    #[test]
    fn test_format_share() {
        assert_eq!(
            format_share(&example_record()),
            "Business Journey Log\nDate: 1/1/2024\nPurpose: Client visit\nStart: SW1A 1AA\n\
             End: EC1A 1BB\nStart Mileage: 1000\nEnd Mileage: 1050\nTotal Distance: 50 miles"
        );
    }

    #[test]
    fn test_format_file() {
        assert_eq!(
            format_file(&example_record()),
            "Business Journey Log\nDate: 1/1/2024\nPurpose: Client visit\n\
             Start Location: SW1A 1AA\nEnd Location: EC1A 1BB\nStart Mileage: 1000\n\
             End Mileage: 1050\nTotal Distance: 50 miles"
        );
    }

    #[test]
    fn test_share_collapses_blank_lines_file_does_not() {
        let mut record = example_record();
        record.purpose = "Depot run\r\n\r\n\r\nthen site B\n".to_string();

        let share = format_share(&record);
        assert!(share.contains("Purpose: Depot run\nthen site B\nStart: SW1A 1AA"));
        assert!(!share.contains('\r'));

        let file = format_file(&record);
        assert!(file.contains("Depot run\r\n\r\n\r\nthen site B\n\nStart Location"));
    }

    #[test]
    fn test_share_trims_and_collapses_field_edges() {
        let mut record = example_record();
        record.purpose = "\n\nClient visit".to_string();
        let share = format_share(&record);
        assert!(share.contains("Purpose: \nClient visit"));

        let record = example_record();
        let share = format_share(&record);
        assert!(share.starts_with(EXPORT_TITLE));
        assert!(share.ends_with("50 miles"));
    }

    #[test]
    fn test_negative_distance_is_rendered() {
        let mut record = example_record();
        record.end_mileage = "900".to_string();
        record.total_distance = -100;
        assert!(format_share(&record).ends_with("Total Distance: -100 miles"));
    }

    #[test]
    fn test_file_name_uses_raw_date() {
        assert_eq!(file_name(&example_record()), "journey-1/1/2024.txt");
    }

    #[test]
    fn test_variant_render() {
        let record = example_record();
        assert_eq!(ExportVariant::Share.render(&record), format_share(&record));
        assert_eq!(ExportVariant::File.render(&record), format_file(&record));
    }
}
