//! TripState - the record threaded through every step

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::llm::Message;

/// Every field of [`TripState`], used by steps to declare what they read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    UserId,
    Source,
    Destination,
    StartDate,
    EndDate,
    Preferences,
    Hobbies,
    SavedPreferences,
    DestinationInfo,
    Itinerary,
    Accommodations,
    Activities,
    FinalPlan,
    Messages,
}

impl StateField {
    /// Fields supplied by the caller before the first step runs
    pub const INPUTS: [StateField; 8] = [
        StateField::UserId,
        StateField::Source,
        StateField::Destination,
        StateField::StartDate,
        StateField::EndDate,
        StateField::Preferences,
        StateField::Hobbies,
        StateField::Messages,
    ];

    /// Write-once fields produced by steps
    pub const OUTPUTS: [StateField; 6] = [
        StateField::SavedPreferences,
        StateField::DestinationInfo,
        StateField::Itinerary,
        StateField::Accommodations,
        StateField::Activities,
        StateField::FinalPlan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StateField::UserId => "user_id",
            StateField::Source => "source",
            StateField::Destination => "destination",
            StateField::StartDate => "start_date",
            StateField::EndDate => "end_date",
            StateField::Preferences => "preferences",
            StateField::Hobbies => "hobbies",
            StateField::SavedPreferences => "saved_preferences",
            StateField::DestinationInfo => "destination_info",
            StateField::Itinerary => "itinerary",
            StateField::Accommodations => "accommodations",
            StateField::Activities => "activities",
            StateField::FinalPlan => "final_plan",
            StateField::Messages => "messages",
        }
    }

    pub fn is_input(&self) -> bool {
        Self::INPUTS.contains(self)
    }

    /// Messages may be extended by any step that declares it; never rewritten
    pub fn is_append_only(&self) -> bool {
        matches!(self, StateField::Messages)
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trip parameters, step outputs and the conversation so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripState {
    /// Memory key; empty means "do not remember"
    pub user_id: String,
    pub source: String,
    pub destination: String,
    /// YYYY-MM-DD
    pub start_date: String,
    /// YYYY-MM-DD; not required to follow start_date
    pub end_date: String,
    pub preferences: String,
    pub hobbies: String,

    pub saved_preferences: Option<String>,
    pub destination_info: Option<String>,
    pub itinerary: Option<String>,
    pub accommodations: Option<String>,
    pub activities: Option<String>,
    pub final_plan: Option<String>,

    /// Append-only conversation log
    pub messages: Vec<Message>,
}

impl TripState {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_preferences(mut self, preferences: impl Into<String>) -> Self {
        self.preferences = preferences.into();
        self
    }

    pub fn with_hobbies(mut self, hobbies: impl Into<String>) -> Self {
        self.hobbies = hobbies.into();
        self
    }

    /// The value of a write-once output field; `None` for inputs
    pub fn output(&self, field: StateField) -> Option<&str> {
        self.output_slot(field).and_then(|v| v.as_deref())
    }

    /// Whether a write-once output field has been written
    pub fn is_written(&self, field: StateField) -> bool {
        self.output(field).is_some()
    }

    /// Write a write-once output field; returns false for non-output fields
    pub fn set_output(&mut self, field: StateField, value: impl Into<String>) -> bool {
        let slot = match field {
            StateField::SavedPreferences => &mut self.saved_preferences,
            StateField::DestinationInfo => &mut self.destination_info,
            StateField::Itinerary => &mut self.itinerary,
            StateField::Accommodations => &mut self.accommodations,
            StateField::Activities => &mut self.activities,
            StateField::FinalPlan => &mut self.final_plan,
            _ => return false,
        };
        *slot = Some(value.into());
        true
    }

    /// Whether `field` holds the same value in both states
    pub fn same_field(&self, other: &TripState, field: StateField) -> bool {
        match field {
            StateField::UserId => self.user_id == other.user_id,
            StateField::Source => self.source == other.source,
            StateField::Destination => self.destination == other.destination,
            StateField::StartDate => self.start_date == other.start_date,
            StateField::EndDate => self.end_date == other.end_date,
            StateField::Preferences => self.preferences == other.preferences,
            StateField::Hobbies => self.hobbies == other.hobbies,
            StateField::Messages => self.messages == other.messages,
            output => self.output_slot(output) == other.output_slot(output),
        }
    }

    fn output_slot(&self, field: StateField) -> Option<&Option<String>> {
        match field {
            StateField::SavedPreferences => Some(&self.saved_preferences),
            StateField::DestinationInfo => Some(&self.destination_info),
            StateField::Itinerary => Some(&self.itinerary),
            StateField::Accommodations => Some(&self.accommodations),
            StateField::Activities => Some(&self.activities),
            StateField::FinalPlan => Some(&self.final_plan),
            _ => None,
        }
    }
}
