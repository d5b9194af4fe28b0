//! calculate_trip_duration tool - inclusive day count between two dates

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::tools::traits::required_str;
use crate::tools::{Tool, ToolError, ToolResult};

pub const INVALID_DATE_MESSAGE: &str = "Invalid date format. Please use YYYY-MM-DD.";

/// Count the days of a trip, both ends included
pub struct TripDurationTool;

/// Inclusive day count, or `None` if either date does not parse
///
/// End before start is not an error: ("2024-01-10", "2024-01-01") gives -8.
pub fn trip_days(start_date: &str, end_date: &str) -> Option<i64> {
    let start = NaiveDate::parse_from_str(start_date.trim(), "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(end_date.trim(), "%Y-%m-%d").ok()?;
    Some((end - start).num_days() + 1)
}

/// The tool's textual answer for a pair of dates
pub fn describe_duration(start_date: &str, end_date: &str) -> String {
    match trip_days(start_date, end_date) {
        Some(days) => format!("{} days", days),
        None => INVALID_DATE_MESSAGE.to_string(),
    }
}

#[async_trait]
impl Tool for TripDurationTool {
    fn name(&self) -> &'static str {
        "calculate_trip_duration"
    }

    fn description(&self) -> &'static str {
        "Calculate the duration of a trip in days, counting both the start and end day."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "start_date": {
                    "type": "string",
                    "description": "Trip start date in YYYY-MM-DD format"
                },
                "end_date": {
                    "type": "string",
                    "description": "Trip end date in YYYY-MM-DD format"
                }
            },
            "required": ["start_date", "end_date"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let start_date = required_str(&input, "start_date")?;
        let end_date = required_str(&input, "end_date")?;
        debug!(%start_date, %end_date, "TripDurationTool::execute: called");

        // A bad date is an answer, not a failure
        Ok(ToolResult::success(describe_duration(start_date, end_date)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_count() {
        assert_eq!(describe_duration("2024-01-01", "2024-01-10"), "10 days");
        assert_eq!(describe_duration("2024-03-05", "2024-03-05"), "1 days");
    }

    #[test]
    fn test_reversed_dates_are_arithmetic() {
        assert_eq!(describe_duration("2024-01-10", "2024-01-01"), "-8 days");
    }

    #[test]
    fn test_leap_year() {
        assert_eq!(trip_days("2024-02-28", "2024-03-01"), Some(3));
        assert_eq!(trip_days("2023-02-28", "2023-03-01"), Some(2));
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(describe_duration("01/01/2024", "2024-01-10"), INVALID_DATE_MESSAGE);
        assert_eq!(describe_duration("2024-01-01", "2024-13-01"), INVALID_DATE_MESSAGE);
        assert_eq!(describe_duration("", ""), INVALID_DATE_MESSAGE);
    }

    #[tokio::test]
    async fn test_execute_invalid_date_is_text_not_error() {
        let result = TripDurationTool
            .execute(serde_json::json!({ "start_date": "soon", "end_date": "later" }))
            .await
            .unwrap();
        assert_eq!(result.content, INVALID_DATE_MESSAGE);
    }

    #[tokio::test]
    async fn test_execute_missing_argument() {
        let result = TripDurationTool
            .execute(serde_json::json!({ "start_date": "2024-01-01" }))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArgument(_))));
    }
}
