mod reveal;
mod standings;
mod submit;
mod watch;

use structopt::StructOpt;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Catalog(#[from] ballot_lib::catalog::CatalogError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Store(#[from] songfest_toolbox::store::Error),

    #[error("ballot still pending after {0} save attempts")]
    SavePending(u32),
}

#[derive(StructOpt)]
#[structopt(
    rename_all = "kebab-case",
    about = "Tally and reveal tooling for ranked country voting"
)]
enum Cli {
    /// Rank a tally sheet into final standings
    Standings(standings::Standings),
    /// Drive a reveal sequence in the terminal
    Reveal(reveal::Reveal),
    /// Submit a ballot to a vote store
    Submit(submit::Submit),
    /// Poll a vote store and reprint live standings
    Watch(watch::Watch),
}

impl Cli {
    fn exec(self) -> Result<(), Error> {
        match self {
            Cli::Standings(cmd) => cmd.exec(),
            Cli::Reveal(cmd) => cmd.exec(),
            Cli::Submit(cmd) => cmd.exec(),
            Cli::Watch(cmd) => cmd.exec(),
        }
    }
}

fn main() -> Result<(), Error> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    Cli::from_args().exec()
}
