//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Where user overrides live, relative to the working directory
pub const OVERRIDE_DIR: &str = ".travelagent/prompts";

/// Renders named `.pmt` templates
pub struct PromptLoader {
    hbs: Handlebars<'static>,
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that honours overrides under `{root}/.travelagent/prompts/`
    pub fn new(root: impl AsRef<Path>) -> Self {
        let user_dir = root.as_ref().join(OVERRIDE_DIR);
        let user_dir_exists = user_dir.is_dir();
        debug!(?user_dir, %user_dir_exists, "PromptLoader::new: called");

        Self {
            hbs: new_registry(),
            user_dir: user_dir_exists.then_some(user_dir),
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: new_registry(),
            user_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.travelagent/prompts/{name}.pmt`
    /// 2. Embedded fallback
    pub fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &impl Serialize) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map(|s| s.trim().to_string())
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Templates overridden on disk, in name order
    pub fn overridden(&self) -> Vec<&'static str> {
        let Some(ref user_dir) = self.user_dir else {
            return Vec::new();
        };
        embedded::NAMES
            .iter()
            .copied()
            .filter(|name| user_dir.join(format!("{}.pmt", name)).exists())
            .collect()
    }
}

fn new_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    // Prompts are plain text; HTML escaping would mangle quotes and ampersands
    hbs.register_escape_fn(handlebars::no_escape);
    hbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Trip {
        source: &'static str,
        destination: &'static str,
        start_date: &'static str,
        end_date: &'static str,
        preferences: &'static str,
        hobbies: &'static str,
    }

    fn trip() -> Trip {
        Trip {
            source: "New York",
            destination: "Rock & Roll \"City\"",
            start_date: "2024-06-01",
            end_date: "2024-06-07",
            preferences: "",
            hobbies: "music",
        }
    }

    #[test]
    fn test_render_travel_details() {
        let loader = PromptLoader::embedded_only();
        let text = loader.render("travel-details", &trip()).unwrap();

        assert!(text.starts_with("Travel Details Received:"));
        assert!(text.contains("- Source: New York"));
        assert!(text.contains("- Dates: 2024-06-01 to 2024-06-07"));
        assert!(text.contains("- Preferences: Not provided"));
        assert!(text.contains("- Hobbies/Interests: music"));
    }

    #[test]
    fn test_render_does_not_escape() {
        let loader = PromptLoader::embedded_only();
        let text = loader.render("travel-details", &trip()).unwrap();
        assert!(text.contains("Rock & Roll \"City\""));
    }

    #[test]
    fn test_user_override_wins() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(OVERRIDE_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("plan-itinerary-system.pmt"), "Plan {{destination}} tersely.").unwrap();

        let loader = PromptLoader::new(temp.path());
        assert_eq!(
            loader.render("plan-itinerary-system", &trip()).unwrap(),
            "Plan Rock & Roll \"City\" tersely."
        );
        assert_eq!(loader.overridden(), vec!["plan-itinerary-system"]);
        // Others still come from the embedded set
        assert!(loader.load_template("travel-details").unwrap().contains("Travel Details"));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}
