//! Boundary with the external vote store: a thin blocking HTTP client
//! plus the local pieces that make it safe to talk to from a live page:
//! a last-known-good cache and a pending-write outbox.

mod cache;
mod outbox;

pub use cache::{TallyCache, REFRESH_INTERVAL};
pub use outbox::{Outbox, PendingVote};

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use ballot_lib::{Ballot, TallySheet};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("vote store answered {0}")]
    Status(StatusCode),
}

/// Retry schedule for reads that expect the voter's own ballot back from
/// an eventually-consistent store.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Attempts while an expected ballot is missing from the response.
    pub missing_ballot_attempts: u32,
    pub missing_ballot_delay: Duration,
    /// Attempts while the store still reports the caller's auth pending.
    pub auth_pending_attempts: u32,
    pub auth_pending_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            missing_ballot_attempts: 3,
            missing_ballot_delay: Duration::from_secs(1),
            auth_pending_attempts: 5,
            auth_pending_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Serialize)]
struct BallotSubmission<'a> {
    votes: &'a Ballot,
}

/// Blocking client for one store's aggregate/ballot resources.
pub struct VoteStore {
    client: Client,
    base_url: String,
}

impl VoteStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn votes_url(&self, edition: &str) -> String {
        format!("{}/votes/{}", self.base_url, edition)
    }

    /// One aggregate read. A failure here is transient by contract; the
    /// caller degrades to its cached sheet instead of surfacing it.
    pub fn fetch_tally(&self, edition: &str) -> Result<TallySheet, Error> {
        let response = self.client.get(self.votes_url(edition)).send()?;
        if !response.status().is_success() {
            return Err(Error::Status(response.status()));
        }
        Ok(response.json()?)
    }

    /// Aggregate read for an authenticated voter: retries while the store
    /// reports auth pending, then while the voter's own ballot is expected
    /// but absent. Exhausting the budget is not an error; absence of a
    /// ballot is a legitimate state.
    pub fn fetch_tally_for_voter(
        &self,
        edition: &str,
        policy: &RetryPolicy,
    ) -> Result<TallySheet, Error> {
        let mut auth_attempts = 0;
        let mut ballot_attempts = 0;
        loop {
            let sheet = self.fetch_tally(edition)?;
            if sheet.auth_pending && auth_attempts < policy.auth_pending_attempts {
                auth_attempts += 1;
                info!(edition, attempt = auth_attempts, "auth pending, retrying");
                thread::sleep(policy.auth_pending_delay);
                continue;
            }
            if sheet.user_ballot.is_none()
                && !sheet.auth_pending
                && ballot_attempts < policy.missing_ballot_attempts
            {
                ballot_attempts += 1;
                warn!(
                    edition,
                    attempt = ballot_attempts,
                    "expected ballot not in response yet, retrying"
                );
                thread::sleep(policy.missing_ballot_delay);
                continue;
            }
            return Ok(sheet);
        }
    }

    /// Persists a ballot; a resubmission fully replaces the voter's
    /// previous one on the store side.
    pub fn submit_ballot(&self, edition: &str, ballot: &Ballot) -> Result<(), Error> {
        let response = self
            .client
            .post(self.votes_url(edition))
            .json(&BallotSubmission { votes: ballot })
            .send()?;
        if !response.status().is_success() {
            return Err(Error::Status(response.status()));
        }
        debug!(edition, "ballot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retry_budget_matches_the_store_contract() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.missing_ballot_attempts, 3);
        assert_eq!(policy.missing_ballot_delay, Duration::from_secs(1));
        assert_eq!(policy.auth_pending_attempts, 5);
        assert_eq!(policy.auth_pending_delay, Duration::from_millis(500));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let store = VoteStore::new("http://localhost:9999/").unwrap();
        assert_eq!(store.votes_url("2024"), "http://localhost:9999/votes/2024");
    }
}
