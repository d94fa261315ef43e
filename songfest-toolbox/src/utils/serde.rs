use serde::{Deserialize, Deserializer};

/// Splits a comma-separated list the way the config files carry them,
/// trimming and lowercasing entries and dropping empties.
pub fn deserialize_comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: String = String::deserialize(deserializer)?;
    Ok(raw
        .split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect())
}
