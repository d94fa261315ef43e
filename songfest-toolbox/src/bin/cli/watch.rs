use std::thread;
use std::time::Duration;

use structopt::StructOpt;
use tracing::info;

use songfest_toolbox::scoring;
use songfest_toolbox::store::{RetryPolicy, TallyCache, VoteStore};

use super::Error;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Watch {
    /// Vote store base url
    #[structopt(long)]
    store_url: String,

    /// Edition/phase key to watch
    #[structopt(long)]
    edition: String,

    /// Seconds between refreshes
    #[structopt(long, default_value = "60")]
    interval_secs: u64,

    /// Wait for this voter's ballot to show up in the first read
    #[structopt(long)]
    voter: Option<String>,

    /// Number of refreshes before exiting; 0 keeps watching
    #[structopt(long, default_value = "0")]
    rounds: u64,
}

impl Watch {
    pub fn exec(self) -> Result<(), Error> {
        let Self {
            store_url,
            edition,
            interval_secs,
            voter,
            rounds,
        } = self;
        let store = VoteStore::new(store_url)?;
        let mut cache =
            TallyCache::new(edition).with_refresh_interval(Duration::from_secs(interval_secs));

        if voter.is_some() {
            // First read goes through the voter retry schedule so an
            // eventually-consistent store gets a chance to echo the ballot.
            match store.fetch_tally_for_voter(cache.edition(), &RetryPolicy::default()) {
                Ok(sheet) => {
                    match &sheet.user_ballot {
                        Some(user) => info!(voter = %user.voter, "ballot found"),
                        None => info!("no ballot yet, voter has not voted"),
                    }
                    cache.put(sheet);
                }
                Err(error) => {
                    tracing::warn!(%error, "initial read failed, starting from empty results")
                }
            }
        }

        let mut round = 0;
        loop {
            round += 1;
            let sheet = cache.sheet();
            println!(
                "--- {} ({} ballots) ---",
                cache.edition(),
                sheet.total_votes
            );
            let standings = scoring::rank(&sheet.scores(), &sheet.country_vote_counts);
            for (position, standing) in standings.iter().enumerate() {
                println!(
                    "{:>2}. {:<24} {:>5} pts ({} votes)",
                    position + 1,
                    standing.country,
                    standing.points,
                    standing.vote_count
                );
            }
            if rounds != 0 && round >= rounds {
                return Ok(());
            }
            thread::sleep(cache.refresh_interval());
            cache.refresh(&store);
        }
    }
}
