//! Timestamp parsing and formatting.
//!
//! Handles the plain `HH:MM:SS[.mmm]`, `MM:SS` and `SS` forms as well as
//! the SRT variant with a comma decimal separator (`00:00:01,500`).

use thiserror::Error;

/// Parse a timestamp string to total seconds.
///
/// # Examples
/// ```
/// use reelc_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("00:00:01,500").unwrap(), 1.5);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim().replace(',', ".");
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    let component = |name: &'static str, raw: &str| -> Result<f64, TimestampError> {
        let value: f64 = raw
            .parse()
            .map_err(|_| TimestampError::InvalidValue(name, raw.to_string()))?;
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        Ok(value)
    };

    match parts.as_slice() {
        [secs] => component("seconds", secs),
        [mins, secs] => Ok(component("minutes", mins)? * 60.0 + component("seconds", secs)?),
        [hours, mins, secs] => Ok(component("hours", hours)? * 3600.0
            + component("minutes", mins)? * 60.0
            + component("seconds", secs)?),
        _ => Err(TimestampError::InvalidFormat(ts.to_string())),
    }
}

/// Format seconds into `HH:MM:SS` or `HH:MM:SS.mmm`.
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,

    #[error("Timestamp cannot be negative")]
    Negative,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timestamp format '{0}'. Use HH:MM:SS, MM:SS, or SS")]
    InvalidFormat(String),
}
