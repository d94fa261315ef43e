use std::fs::File;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use structopt::StructOpt;

use ballot_lib::Ballot;
use songfest_toolbox::store::{Outbox, VoteStore};

use super::Error;

const SAVE_ATTEMPTS: u32 = 3;
const SAVE_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Submit {
    /// Ballot json path: an array of 10 country names, "" for empty slots
    ballot: PathBuf,

    /// Vote store base url
    #[structopt(long)]
    store_url: String,

    /// Edition/phase key the ballot belongs to
    #[structopt(long)]
    edition: String,

    /// Voter identity the pending queue is keyed by
    #[structopt(long)]
    voter: String,
}

impl Submit {
    pub fn exec(self) -> Result<(), Error> {
        let Self {
            ballot,
            store_url,
            edition,
            voter,
        } = self;
        let ballot: Ballot = serde_json::from_reader(File::open(&ballot)?)?;
        let store = VoteStore::new(store_url)?;

        let mut outbox = Outbox::new();
        outbox.enqueue(voter, edition, ballot);
        for attempt in 1..=SAVE_ATTEMPTS {
            outbox.flush(&store);
            if !outbox.is_pending() {
                println!("ballot saved");
                return Ok(());
            }
            if attempt < SAVE_ATTEMPTS {
                thread::sleep(SAVE_RETRY_DELAY);
            }
        }
        Err(Error::SavePending(SAVE_ATTEMPTS))
    }
}
