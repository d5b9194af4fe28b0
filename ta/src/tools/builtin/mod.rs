//! Built-in travel tools

mod search;
mod season;
mod trip_duration;

pub use search::{WebSearchTool, format_results};
pub use season::{SeasonTool, describe_season, month_number, season_for_month};
pub use trip_duration::{INVALID_DATE_MESSAGE, TripDurationTool, describe_duration, trip_days};
