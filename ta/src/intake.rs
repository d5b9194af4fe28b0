//! Interactive trip intake
//!
//! Asks for whatever the command line did not supply. Required answers are
//! asked again until non-empty, dates until they parse as `YYYY-MM-DD`.

use std::io::Write;

use chrono::NaiveDate;
use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::cli::PlanArgs;
use crate::pipeline::TripState;

pub const REQUIRED_MESSAGE: &str = "This field is required. Please provide a value.";
pub const DATE_FORMAT_MESSAGE: &str = "Invalid date format. Please use YYYY-MM-DD (e.g., 2024-12-25)";

/// Source of answers; `Ok(None)` means the user cancelled (Ctrl-C / Ctrl-D)
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Terminal reader with line editing
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
        Ok(Self { editor })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(&format!("{}: ", prompt)) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("EditorReader::read_line: cancelled");
                Ok(None)
            }
            Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
        }
    }
}

/// Canned answers, one per prompt; running out counts as cancelling
impl LineReader for std::collections::VecDeque<String> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.pop_front())
    }
}

/// What intake produced
#[derive(Debug, Clone, PartialEq)]
pub enum Intake {
    Ready(Box<TripState>),
    Cancelled,
}

pub fn is_valid_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Collects trip details, prompting only for values `args` leaves out
pub struct TripIntake<'a, R: LineReader, W: Write> {
    reader: &'a mut R,
    out: &'a mut W,
}

impl<'a, R: LineReader, W: Write> TripIntake<'a, R, W> {
    pub fn new(reader: &'a mut R, out: &'a mut W) -> Self {
        Self { reader, out }
    }

    pub fn collect(&mut self, args: &PlanArgs) -> Result<Intake> {
        debug!(?args, "TripIntake::collect: called");
        let interactive = [&args.source, &args.destination, &args.start_date, &args.end_date]
            .iter()
            .any(|v| v.is_none());
        if interactive {
            writeln!(self.out, "Let's plan your trip! Please provide the following details:\n")?;
        }

        macro_rules! answer {
            ($e:expr) => {
                match $e? {
                    Some(v) => v,
                    None => return Ok(Intake::Cancelled),
                }
            };
        }

        let source = answer!(self.required(args.source.as_deref(), "Starting location (city, country)"));
        let destination = answer!(self.required(args.destination.as_deref(), "Destination (city, country)"));
        let start_date = answer!(self.date(args.start_date.as_deref(), "Trip start date"));
        let end_date = answer!(self.date(args.end_date.as_deref(), "Trip end date"));

        let preferences = answer!(self.optional(
            args.preferences.as_deref(),
            "Travel preferences (e.g., budget-friendly, luxury, family-friendly, solo travel)"
        ));
        let hobbies = answer!(self.optional(
            args.hobbies.as_deref(),
            "Your hobbies and interests (e.g., photography, hiking, food, history, art)"
        ));
        let user_id = answer!(self.optional(args.user.as_deref(), "User id to remember your preferences (optional)"));

        let state = TripState::new(source, destination, start_date, end_date)
            .with_user(user_id)
            .with_preferences(preferences)
            .with_hobbies(hobbies);
        debug!(destination = %state.destination, "TripIntake::collect: complete");
        Ok(Intake::Ready(Box::new(state)))
    }

    fn required(&mut self, given: Option<&str>, prompt: &str) -> Result<Option<String>> {
        if let Some(value) = given.map(str::trim)
            && !value.is_empty()
        {
            return Ok(Some(value.to_string()));
        }
        loop {
            let Some(line) = self.reader.read_line(prompt)? else {
                return Ok(None);
            };
            let value = line.trim();
            if !value.is_empty() {
                return Ok(Some(value.to_string()));
            }
            writeln!(self.out, "{}", REQUIRED_MESSAGE.yellow())?;
        }
    }

    fn date(&mut self, given: Option<&str>, prompt: &str) -> Result<Option<String>> {
        if let Some(value) = given.map(str::trim) {
            if is_valid_date(value) {
                return Ok(Some(value.to_string()));
            }
            debug!(%value, "TripIntake::date: flag value rejected");
            writeln!(self.out, "{}", DATE_FORMAT_MESSAGE.yellow())?;
        }
        let prompt = format!("{} (YYYY-MM-DD)", prompt);
        loop {
            let Some(value) = self.required(None, &prompt)? else {
                return Ok(None);
            };
            if is_valid_date(&value) {
                return Ok(Some(value));
            }
            writeln!(self.out, "{}", DATE_FORMAT_MESSAGE.yellow())?;
        }
    }

    fn optional(&mut self, given: Option<&str>, prompt: &str) -> Result<Option<String>> {
        if let Some(value) = given {
            return Ok(Some(value.trim().to_string()));
        }
        Ok(self.reader.read_line(prompt)?.map(|line| line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn answers(lines: &[&str]) -> VecDeque<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    fn collect(lines: &[&str], args: &PlanArgs) -> (Intake, String, usize) {
        let mut reader = answers(lines);
        let mut out = Vec::new();
        let intake = TripIntake::new(&mut reader, &mut out).collect(args).unwrap();
        (intake, String::from_utf8(out).unwrap(), reader.len())
    }

    fn ready(intake: Intake) -> TripState {
        match intake {
            Intake::Ready(state) => *state,
            Intake::Cancelled => panic!("expected ready"),
        }
    }

    #[test]
    fn test_full_interactive_intake() {
        let (intake, _, left) = collect(
            &[
                "Boston, USA",
                "Kyoto, Japan",
                "2024-04-01",
                "2024-04-07",
                "slow travel",
                "temples, tea",
                "alice",
            ],
            &PlanArgs::default(),
        );
        let state = ready(intake);
        assert_eq!(state.source, "Boston, USA");
        assert_eq!(state.destination, "Kyoto, Japan");
        assert_eq!(state.start_date, "2024-04-01");
        assert_eq!(state.end_date, "2024-04-07");
        assert_eq!(state.preferences, "slow travel");
        assert_eq!(state.hobbies, "temples, tea");
        assert_eq!(state.user_id, "alice");
        assert!(state.messages.is_empty());
        assert_eq!(left, 0);
    }

    #[test]
    fn test_required_field_reprompts_when_empty() {
        let (intake, out, _) = collect(
            &["", "   ", "Boston", "Kyoto", "2024-04-01", "2024-04-07", "", "", ""],
            &PlanArgs::default(),
        );
        let state = ready(intake);
        assert_eq!(state.source, "Boston");
        assert_eq!(out.matches(REQUIRED_MESSAGE).count(), 2);
    }

    #[test]
    fn test_date_reprompts_until_valid() {
        let (intake, out, _) = collect(
            &["Boston", "Kyoto", "April 1st", "2024-13-01", "2024-04-01", "2024-04-07", "", "", ""],
            &PlanArgs::default(),
        );
        let state = ready(intake);
        assert_eq!(state.start_date, "2024-04-01");
        assert_eq!(out.matches(DATE_FORMAT_MESSAGE).count(), 2);
    }

    #[test]
    fn test_optional_fields_may_be_empty() {
        let (intake, out, _) = collect(
            &["Boston", "Kyoto", "2024-04-01", "2024-04-07", "", "", ""],
            &PlanArgs::default(),
        );
        let state = ready(intake);
        assert!(state.preferences.is_empty());
        assert!(state.hobbies.is_empty());
        assert!(state.user_id.is_empty());
        assert!(!out.contains(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_flags_skip_prompts() {
        let args = PlanArgs {
            user: Some("bob".to_string()),
            source: Some("Paris".to_string()),
            destination: Some("Rome".to_string()),
            start_date: Some("2024-06-01".to_string()),
            end_date: Some("2024-06-05".to_string()),
            preferences: Some("luxury".to_string()),
            hobbies: Some("art".to_string()),
            no_save: false,
        };
        let (intake, out, left) = collect(&["unused"], &args);
        let state = ready(intake);
        assert_eq!(state.destination, "Rome");
        assert_eq!(state.user_id, "bob");
        assert_eq!(left, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_invalid_date_flag_falls_back_to_prompt() {
        let args = PlanArgs {
            source: Some("Paris".to_string()),
            destination: Some("Rome".to_string()),
            start_date: Some("06/01/2024".to_string()),
            end_date: Some("2024-06-05".to_string()),
            ..Default::default()
        };
        let (intake, out, _) = collect(&["2024-06-01", "", "", ""], &args);
        let state = ready(intake);
        assert_eq!(state.start_date, "2024-06-01");
        assert!(out.contains(DATE_FORMAT_MESSAGE));
    }

    #[test]
    fn test_cancel_mid_intake() {
        let (intake, _, _) = collect(&["Boston", "Kyoto"], &PlanArgs::default());
        assert_eq!(intake, Intake::Cancelled);
    }

    #[test]
    fn test_is_valid_date() {
        assert!(is_valid_date("2024-02-29"));
        assert!(!is_valid_date("2023-02-29"));
        assert!(!is_valid_date("2024-4-1x"));
        assert!(!is_valid_date(""));
    }
}
