//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

pub const RESEARCH_DESTINATION_SYSTEM: &str = include_str!("../../prompts/research-destination-system.pmt");
pub const RESEARCH_DESTINATION_USER: &str = include_str!("../../prompts/research-destination-user.pmt");
pub const PLAN_ITINERARY_SYSTEM: &str = include_str!("../../prompts/plan-itinerary-system.pmt");
pub const PLAN_ITINERARY_USER: &str = include_str!("../../prompts/plan-itinerary-user.pmt");
pub const SUGGEST_ACCOMMODATIONS_SYSTEM: &str = include_str!("../../prompts/suggest-accommodations-system.pmt");
pub const SUGGEST_ACCOMMODATIONS_USER: &str = include_str!("../../prompts/suggest-accommodations-user.pmt");
pub const RECOMMEND_ACTIVITIES_SYSTEM: &str = include_str!("../../prompts/recommend-activities-system.pmt");
pub const RECOMMEND_ACTIVITIES_USER: &str = include_str!("../../prompts/recommend-activities-user.pmt");
pub const COMPILE_FINAL_PLAN_SYSTEM: &str = include_str!("../../prompts/compile-final-plan-system.pmt");
pub const COMPILE_FINAL_PLAN_USER: &str = include_str!("../../prompts/compile-final-plan-user.pmt");

/// Summary turn appended once the trip details are accepted
pub const TRAVEL_DETAILS: &str = include_str!("../../prompts/travel-details.pmt");

/// Every embedded template name, for listing and override discovery
pub const NAMES: [&str; 11] = [
    "research-destination-system",
    "research-destination-user",
    "plan-itinerary-system",
    "plan-itinerary-user",
    "suggest-accommodations-system",
    "suggest-accommodations-user",
    "recommend-activities-system",
    "recommend-activities-user",
    "compile-final-plan-system",
    "compile-final-plan-user",
    "travel-details",
];

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    let template = match name {
        "research-destination-system" => RESEARCH_DESTINATION_SYSTEM,
        "research-destination-user" => RESEARCH_DESTINATION_USER,
        "plan-itinerary-system" => PLAN_ITINERARY_SYSTEM,
        "plan-itinerary-user" => PLAN_ITINERARY_USER,
        "suggest-accommodations-system" => SUGGEST_ACCOMMODATIONS_SYSTEM,
        "suggest-accommodations-user" => SUGGEST_ACCOMMODATIONS_USER,
        "recommend-activities-system" => RECOMMEND_ACTIVITIES_SYSTEM,
        "recommend-activities-user" => RECOMMEND_ACTIVITIES_USER,
        "compile-final-plan-system" => COMPILE_FINAL_PLAN_SYSTEM,
        "compile-final-plan-user" => COMPILE_FINAL_PLAN_USER,
        "travel-details" => TRAVEL_DETAILS,
        _ => {
            debug!("get_embedded: no match found");
            return None;
        }
    };
    Some(template)
}
