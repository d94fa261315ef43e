use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::Country;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Snippet of a performance video: the hosting service's clip id plus the
/// second range to play when a reveal settles on the entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ClipRef {
    #[serde(rename = "videoId", alias = "video_id")]
    pub video_id: String,
    #[serde(default)]
    pub start_secs: u64,
    #[serde(default)]
    pub end_secs: u64,
}

impl ClipRef {
    /// Playback duration, never below one second even for degenerate ranges.
    pub fn duration(&self) -> Duration {
        Duration::from_secs((self.end_secs.max(self.start_secs) - self.start_secs).max(1))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: String,
    pub performer: String,
    pub song: String,
    #[serde(default)]
    pub clip: Option<ClipRef>,
}

/// Static per-edition reference data, read once and never mutated.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Catalog(BTreeMap<Country, CatalogEntry>);

impl Catalog {
    pub fn from_reader(reader: impl Read) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn get(&self, country: &str) -> Option<&CatalogEntry> {
        self.0.get(country)
    }

    pub fn clip(&self, country: &str) -> Option<&ClipRef> {
        self.get(country).and_then(|entry| entry.clip.as_ref())
    }

    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Country, &CatalogEntry)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDITION: &str = r#"
Italy:
  code: IT
  performer: "Mahmood & Blanco"
  song: Brividi
  clip:
    videoId: abc123
    start_secs: 40
    end_secs: 55
Sweden:
  code: SE
  performer: Cornelia Jakobs
  song: Hold Me Closer
"#;

    #[test]
    fn loads_edition_yaml() {
        let catalog = Catalog::from_reader(EDITION.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);

        let italy = catalog.get("Italy").unwrap();
        assert_eq!(italy.code, "IT");
        assert_eq!(italy.performer, "Mahmood & Blanco");

        let clip = catalog.clip("Italy").unwrap();
        assert_eq!(clip.video_id, "abc123");
        assert_eq!(clip.duration(), Duration::from_secs(15));

        assert!(catalog.clip("Sweden").is_none());
        assert!(catalog.get("Norway").is_none());
    }

    #[test]
    fn clip_duration_floors_at_one_second() {
        let clip = ClipRef {
            video_id: "abc123".to_string(),
            start_secs: 20,
            end_secs: 20,
        };
        assert_eq!(clip.duration(), Duration::from_secs(1));

        let reversed = ClipRef {
            video_id: "abc123".to_string(),
            start_secs: 30,
            end_secs: 10,
        };
        assert_eq!(reversed.duration(), Duration::from_secs(1));
    }
}
