//! get_season_info tool - rough Northern-Hemisphere season for a month

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::tools::traits::required_str;
use crate::tools::{Tool, ToolError, ToolResult};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Look up the typical season for a month at a destination
pub struct SeasonTool;

/// Month name (any case) or number 1-12 to its month number
pub fn month_number(month: &str) -> Option<u32> {
    let month = month.trim();
    let lower = month.to_lowercase();
    if let Some(idx) = MONTH_NAMES.iter().position(|m| *m == lower) {
        return Some(idx as u32 + 1);
    }
    month.parse::<u32>().ok().filter(|n| (1..=12).contains(n))
}

/// Northern-Hemisphere season, "Unknown" for anything unrecognised
pub fn season_for_month(month: &str) -> &'static str {
    match month_number(month) {
        Some(12 | 1 | 2) => "Winter",
        Some(3..=5) => "Spring",
        Some(6..=8) => "Summer",
        Some(9..=11) => "Fall",
        _ => "Unknown",
    }
}

pub fn describe_season(destination: &str, month: &str) -> String {
    format!(
        "In {}, the season in month {} is typically {}. Consider checking current weather forecasts for accurate information.",
        destination,
        month,
        season_for_month(month)
    )
}

#[async_trait]
impl Tool for SeasonTool {
    fn name(&self) -> &'static str {
        "get_season_info"
    }

    fn description(&self) -> &'static str {
        "Get general season information for a destination in a given month."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "destination": {
                    "type": "string",
                    "description": "The destination location"
                },
                "month": {
                    "type": "string",
                    "description": "Month name (e.g. July) or number (e.g. 7)"
                }
            },
            "required": ["destination", "month"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let destination = required_str(&input, "destination")?;
        // Models sometimes send the month as a number
        let month = match input.get("month") {
            Some(Value::Number(n)) => n.to_string(),
            _ => required_str(&input, "month")?.to_string(),
        };
        debug!(%destination, %month, "SeasonTool::execute: called");

        Ok(ToolResult::success(describe_season(destination, &month)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_names_any_case() {
        assert_eq!(season_for_month("July"), "Summer");
        assert_eq!(season_for_month("july"), "Summer");
        assert_eq!(season_for_month("DECEMBER"), "Winter");
        assert_eq!(season_for_month("april"), "Spring");
        assert_eq!(season_for_month("October"), "Fall");
    }

    #[test]
    fn test_month_numbers() {
        assert_eq!(season_for_month("7"), "Summer");
        assert_eq!(season_for_month("1"), "Winter");
        assert_eq!(season_for_month("12"), "Winter");
        assert_eq!(season_for_month("3"), "Spring");
        assert_eq!(season_for_month("11"), "Fall");
    }

    #[test]
    fn test_unknown_months() {
        assert_eq!(season_for_month("Smarch"), "Unknown");
        assert_eq!(season_for_month("13"), "Unknown");
        assert_eq!(season_for_month("0"), "Unknown");
        assert_eq!(season_for_month(""), "Unknown");
    }

    #[test]
    fn test_describe_season() {
        let text = describe_season("Paris", "July");
        assert!(text.starts_with("In Paris, the season in month July is typically Summer."));
    }

    #[tokio::test]
    async fn test_execute_accepts_numeric_month() {
        let result = SeasonTool
            .execute(serde_json::json!({ "destination": "Oslo", "month": 1 }))
            .await
            .unwrap();
        assert!(result.content.contains("Winter"));
        assert!(!result.is_error);
    }
}
