use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::utils::serde::deserialize_comma_separated;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Whether live results are shown to everyone or kept behind the GM list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    Visible,
    Hide,
}

impl Default for DisplayMode {
    fn default() -> Self {
        DisplayMode::Visible
    }
}

impl<'de> Deserialize<'de> for DisplayMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mode: String = String::deserialize(deserializer)?;
        Ok(match mode.to_lowercase().as_ref() {
            "hide" => DisplayMode::Hide,
            _ => DisplayMode::Visible,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EditionConfig {
    /// Whether voting is currently open for the edition.
    #[serde(default, alias = "Status")]
    pub status: bool,
    /// Countdown target shown before voting opens, `"HH:MM DD.MM.YYYY"`.
    #[serde(default, alias = "ShowCountDown")]
    pub show_countdown: Option<String>,
    #[serde(default, alias = "Mode")]
    pub mode: DisplayMode,
    /// Allow-listed admin emails, comma-separated in the file.
    #[serde(
        default,
        alias = "GMs",
        deserialize_with = "deserialize_comma_separated"
    )]
    pub gms: Vec<String>,
    #[serde(default, alias = "UnderConstruction")]
    pub under_construction: bool,
}

impl EditionConfig {
    /// Emails are opaque identifiers; membership is case-insensitive on
    /// the trimmed address.
    pub fn is_gm(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.gms.iter().any(|gm| gm == &email)
    }

    /// Hide mode keeps results to GMs; everyone sees them otherwise.
    pub fn can_view_results(&self, email: Option<&str>) -> bool {
        match self.mode {
            DisplayMode::Visible => true,
            DisplayMode::Hide => email.map(|email| self.is_gm(email)).unwrap_or(false),
        }
    }
}

/// Per-edition display flags and admin allow-lists. Read-only to the
/// engine; ownership of the values stays with the deployment config.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VoteConfig(BTreeMap<String, EditionConfig>);

impl VoteConfig {
    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn edition(&self, key: &str) -> Option<&EditionConfig> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EditionConfig)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
"2024":
  Status: true
  Mode: visible
  GMs: "Host@example.com, producer@example.com"
"2025":
  Status: false
  Mode: hide
  ShowCountDown: "19:00 01.11.2025"
  GMs: "host@example.com"
"2026":
  UnderConstruction: true
"#;

    #[test]
    fn parses_the_edition_file_shape() {
        let config = VoteConfig::from_reader(CONFIG.as_bytes()).unwrap();

        let open = config.edition("2024").unwrap();
        assert!(open.status);
        assert_eq!(open.mode, DisplayMode::Visible);
        assert_eq!(open.gms, ["host@example.com", "producer@example.com"]);

        let hidden = config.edition("2025").unwrap();
        assert_eq!(hidden.mode, DisplayMode::Hide);
        assert_eq!(hidden.show_countdown.as_deref(), Some("19:00 01.11.2025"));

        let construction = config.edition("2026").unwrap();
        assert!(construction.under_construction);
        assert_eq!(construction.mode, DisplayMode::Visible);

        assert!(config.edition("2019").is_none());
    }

    #[test]
    fn gm_membership_is_case_insensitive() {
        let config = VoteConfig::from_reader(CONFIG.as_bytes()).unwrap();
        let edition = config.edition("2024").unwrap();

        assert!(edition.is_gm("HOST@example.com"));
        assert!(edition.is_gm("  producer@example.com  "));
        assert!(!edition.is_gm("viewer@example.com"));
    }

    #[test]
    fn hide_mode_blocks_everyone_but_gms() {
        let config = VoteConfig::from_reader(CONFIG.as_bytes()).unwrap();

        let visible = config.edition("2024").unwrap();
        assert!(visible.can_view_results(None));
        assert!(visible.can_view_results(Some("viewer@example.com")));

        let hidden = config.edition("2025").unwrap();
        assert!(!hidden.can_view_results(None));
        assert!(!hidden.can_view_results(Some("viewer@example.com")));
        assert!(hidden.can_view_results(Some("Host@example.com")));
    }

    #[test]
    fn unknown_mode_strings_default_to_visible() {
        let config =
            VoteConfig::from_reader(r#"{"2024": {"Mode": "whatever"}}"#.as_bytes()).unwrap();
        assert_eq!(config.edition("2024").unwrap().mode, DisplayMode::Visible);
    }
}
