//! Raw incident submissions and their validation into [`IncidentRecord`]s.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::IncidentRecord;

/// Expected date format for submissions and query bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Expected time format for submissions.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Errors produced when user input is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields were absent or blank.
    #[error("Missing required field(s): {}", .missing.join(", "))]
    MissingFields {
        /// Names of the missing fields, in declaration order.
        missing: Vec<&'static str>,
    },

    /// A date was not in `YYYY-MM-DD` form.
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// A time was not in `HH:MM:SS` form.
    #[error("Invalid time '{value}': expected HH:MM:SS")]
    InvalidTime {
        /// The rejected input.
        value: String,
    },

    /// A field held a value that could not be parsed.
    #[error("Invalid value '{value}' for {field}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// An incident as submitted by a client, before validation.
///
/// Every field is optional at this stage so that a missing field is
/// reported as a [`ValidationError`] instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentSubmission {
    /// Case number.
    pub case_number: Option<String>,
    /// Date as `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Time as `HH:MM:SS`.
    pub time: Option<String>,
    /// Incident code.
    pub code: Option<i32>,
    /// Free-text detail.
    pub incident: Option<String>,
    /// Police grid number.
    pub police_grid: Option<i32>,
    /// Neighborhood number.
    pub neighborhood_number: Option<i32>,
    /// Block address.
    pub block: Option<String>,
}

impl IncidentSubmission {
    /// Validates the submission and converts it into an [`IncidentRecord`].
    ///
    /// Blank strings count as missing. All missing fields are reported
    /// together before any format checks run.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] if any field is absent or
    /// blank, or [`ValidationError::InvalidDate`] /
    /// [`ValidationError::InvalidTime`] if the date or time is malformed.
    pub fn validate(&self) -> Result<IncidentRecord, ValidationError> {
        let mut missing = Vec::new();

        let case_number = required_text(self.case_number.as_deref(), "case_number", &mut missing);
        let date = required_text(self.date.as_deref(), "date", &mut missing);
        let time = required_text(self.time.as_deref(), "time", &mut missing);
        if self.code.is_none() {
            missing.push("code");
        }
        let incident = required_text(self.incident.as_deref(), "incident", &mut missing);
        if self.police_grid.is_none() {
            missing.push("police_grid");
        }
        if self.neighborhood_number.is_none() {
            missing.push("neighborhood_number");
        }
        let block = required_text(self.block.as_deref(), "block", &mut missing);

        let (
            Some(case_number),
            Some(date),
            Some(time),
            Some(code),
            Some(incident),
            Some(police_grid),
            Some(neighborhood_number),
            Some(block),
        ) = (
            case_number,
            date,
            time,
            self.code,
            incident,
            self.police_grid,
            self.neighborhood_number,
            block,
        )
        else {
            return Err(ValidationError::MissingFields { missing });
        };

        Ok(IncidentRecord {
            case_number: case_number.to_string(),
            date: parse_date(date)?,
            time: parse_time(time)?,
            code,
            incident: incident.to_string(),
            police_grid,
            neighborhood_number,
            block: block.to_string(),
        })
    }
}

impl From<&IncidentRecord> for IncidentSubmission {
    fn from(record: &IncidentRecord) -> Self {
        Self {
            case_number: Some(record.case_number.clone()),
            date: Some(record.date.format(DATE_FORMAT).to_string()),
            time: Some(record.time.format(TIME_FORMAT).to_string()),
            code: Some(record.code),
            incident: Some(record.incident.clone()),
            police_grid: Some(record.police_grid),
            neighborhood_number: Some(record.neighborhood_number),
            block: Some(record.block.clone()),
        }
    }
}

fn required_text<'a>(
    value: Option<&'a str>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(field);
            None
        }
    }
}

/// Parses a `YYYY-MM-DD` date with a four-digit year.
///
/// Dates are stored as text and compared lexicographically, so signed or
/// five-digit years are rejected along with unpadded months and days.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] if the input is malformed.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDate {
        value: value.to_string(),
    };
    let trimmed = value.trim();
    if trimmed.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .filter(|date| (0..=9999).contains(&date.year()))
        .ok_or_else(invalid)
}

/// Parses an `HH:MM:SS` time.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTime`] if the input is malformed.
pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        ValidationError::InvalidTime {
            value: value.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> IncidentSubmission {
        IncidentSubmission {
            case_number: Some("23001234".to_string()),
            date: Some("2023-01-14".to_string()),
            time: Some("08:30:00".to_string()),
            code: Some(600),
            incident: Some("Theft".to_string()),
            police_grid: Some(87),
            neighborhood_number: Some(14),
            block: Some("17XX GRAND AV".to_string()),
        }
    }

    #[test]
    fn complete_submission_validates() {
        let record = complete().validate().unwrap();
        assert_eq!(record.case_number, "23001234");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2023, 1, 14).unwrap());
        assert_eq!(record.time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(record.neighborhood_number, 14);
    }

    #[test]
    fn empty_block_is_missing() {
        let submission = IncidentSubmission {
            block: Some("   ".to_string()),
            ..complete()
        };
        assert_eq!(
            submission.validate(),
            Err(ValidationError::MissingFields {
                missing: vec!["block"]
            })
        );
    }

    #[test]
    fn reports_every_missing_field() {
        let err = IncidentSubmission::default().validate().unwrap_err();
        let ValidationError::MissingFields { missing } = err else {
            panic!("expected MissingFields, got {err:?}");
        };
        assert_eq!(
            missing,
            vec![
                "case_number",
                "date",
                "time",
                "code",
                "incident",
                "police_grid",
                "neighborhood_number",
                "block",
            ]
        );
    }

    #[test]
    fn malformed_date_is_rejected() {
        let submission = IncidentSubmission {
            date: Some("01/14/2023".to_string()),
            ..complete()
        };
        assert!(matches!(
            submission.validate(),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn dates_outside_four_digit_years_are_rejected() {
        for value in ["+10000-01-01", "-0001-01-01", "2023-1-14", "+999-01-01"] {
            assert!(
                matches!(parse_date(value), Err(ValidationError::InvalidDate { .. })),
                "{value} should be rejected"
            );
        }
        assert_eq!(
            parse_date(" 9999-12-31 ").unwrap(),
            NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()
        );
    }

    #[test]
    fn malformed_time_is_rejected() {
        let submission = IncidentSubmission {
            time: Some("8am".to_string()),
            ..complete()
        };
        assert!(matches!(
            submission.validate(),
            Err(ValidationError::InvalidTime { .. })
        ));
    }

    #[test]
    fn record_converts_back_to_submission() {
        let record = complete().validate().unwrap();
        let again = IncidentSubmission::from(&record).validate().unwrap();
        assert_eq!(record, again);
    }
}
