use std::time::Duration;

use tracing::warn;

use ballot_lib::TallySheet;

use super::VoteStore;

/// How often a visible results board refreshes from the store.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Last-known-good aggregate for one edition.
///
/// Successful refreshes overwrite the sheet; failed ones keep it, so the
/// board degrades to stale (or zeroed) data instead of erroring. There is
/// exactly one logical writer per ballot, so no locking is needed; the
/// store arbitrates any true concurrent writes.
pub struct TallyCache {
    edition: String,
    sheet: TallySheet,
    refresh_interval: Duration,
}

impl TallyCache {
    pub fn new(edition: impl Into<String>) -> Self {
        Self {
            edition: edition.into(),
            sheet: TallySheet::default(),
            refresh_interval: REFRESH_INTERVAL,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn edition(&self) -> &str {
        &self.edition
    }

    pub fn sheet(&self) -> &TallySheet {
        &self.sheet
    }

    /// How long the driver should wait before the next poll while a
    /// results display is active.
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Pulls a fresh sheet, keeping the cached one on any failure.
    pub fn refresh(&mut self, store: &VoteStore) -> &TallySheet {
        match store.fetch_tally(&self.edition) {
            Ok(sheet) => self.sheet = sheet,
            Err(error) => warn!(
                edition = %self.edition,
                %error,
                "refresh failed, keeping last known results"
            ),
        }
        &self.sheet
    }

    /// Replaces the cache after a local optimistic recompute.
    pub fn put(&mut self, sheet: TallySheet) {
        self.sheet = sheet;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_lib::CountryTally;

    #[test]
    fn failed_refresh_keeps_the_cached_sheet() {
        // Nothing listens here; the refresh must fail fast and leave the
        // optimistically-stored sheet in place.
        let store = VoteStore::new("http://127.0.0.1:1").unwrap();
        let mut cache = TallyCache::new("2024");

        let mut sheet = TallySheet::default();
        sheet
            .country_points
            .insert("Italy".to_string(), CountryTally::Total(12));
        sheet.total_votes = 1;
        cache.put(sheet);

        let after = cache.refresh(&store);
        assert_eq!(after.points_of("Italy"), 12);
        assert_eq!(after.total_votes, 1);
    }

    #[test]
    fn starts_from_an_empty_zeroed_sheet() {
        let cache = TallyCache::new("2024");
        assert_eq!(cache.sheet().total_votes, 0);
        assert!(cache.sheet().country_points.is_empty());
        assert_eq!(cache.refresh_interval(), REFRESH_INTERVAL);
    }
}
