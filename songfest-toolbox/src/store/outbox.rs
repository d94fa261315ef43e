use std::collections::BTreeMap;

use tracing::{info, warn};

use ballot_lib::Ballot;

use super::VoteStore;

/// A not-yet-persisted ballot, kept until a flush gets it through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingVote {
    pub edition: String,
    pub ballot: Ballot,
}

/// Pending-write queue for optimistic saves.
///
/// Keyed by voter with replace-by-latest semantics: enqueueing a newer
/// ballot for the same voter supersedes the queued one, matching the
/// store's own submission idempotence. Flush is triggered by the driver
/// on save, on visibility change and on unload; whatever fails stays
/// queued for the next trigger.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: BTreeMap<String, PendingVote>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, voter: impl Into<String>, edition: impl Into<String>, ballot: Ballot) {
        self.pending.insert(
            voter.into(),
            PendingVote {
                edition: edition.into(),
                ballot,
            },
        );
    }

    /// Whether a "don't leave this page yet" indicator should show.
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_for(&self, voter: &str) -> Option<&PendingVote> {
        self.pending.get(voter)
    }

    /// Attempts every pending write; failures stay queued. Returns how
    /// many ballots went through.
    pub fn flush(&mut self, store: &VoteStore) -> usize {
        let mut sent = Vec::new();
        for (voter, vote) in &self.pending {
            match store.submit_ballot(&vote.edition, &vote.ballot) {
                Ok(()) => {
                    info!(voter = %voter, edition = %vote.edition, "pending ballot saved");
                    sent.push(voter.clone());
                }
                Err(error) => {
                    warn!(voter = %voter, %error, "ballot save failed, keeping pending");
                }
            }
        }
        let count = sent.len();
        for voter in sent {
            self.pending.remove(&voter);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballot(countries: &[&str]) -> Ballot {
        Ballot::from_slots(countries.iter().map(|c| Some(c.to_string()))).unwrap()
    }

    #[test]
    fn newer_ballots_replace_queued_ones_per_voter() {
        let mut outbox = Outbox::new();
        outbox.enqueue("a@example.com", "2024", ballot(&["Italy"]));
        outbox.enqueue("a@example.com", "2024", ballot(&["Sweden"]));
        outbox.enqueue("b@example.com", "2024", ballot(&["Norway"]));

        assert_eq!(outbox.len(), 2);
        let pending = outbox.pending_for("a@example.com").unwrap();
        assert_eq!(pending.ballot.get(0).map(String::as_str), Some("Sweden"));
    }

    #[test]
    fn failed_flush_keeps_everything_queued() {
        let store = VoteStore::new("http://127.0.0.1:1").unwrap();
        let mut outbox = Outbox::new();
        outbox.enqueue("a@example.com", "2024", ballot(&["Italy"]));

        assert_eq!(outbox.flush(&store), 0);
        assert!(outbox.is_pending());
        assert_eq!(outbox.len(), 1);
    }
}
