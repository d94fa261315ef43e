use std::fs::File;
use std::path::PathBuf;

use structopt::StructOpt;
use tracing::info;

use ballot_lib::TallySheet;
use songfest_toolbox::scoring::{self, jury_scale_factor};
use songfest_toolbox::utils::csv::dump_data_to_csv;

use super::Error;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Standings {
    /// Tally sheet json path
    from: PathBuf,

    /// Jury tally sheet to merge in with the scaled jury contribution
    #[structopt(long)]
    jury: Option<PathBuf>,

    /// Standings csv output path; prints to stdout when omitted
    #[structopt(long)]
    output: Option<PathBuf>,
}

impl Standings {
    pub fn exec(self) -> Result<(), Error> {
        let Self { from, jury, output } = self;
        let sheet: TallySheet = serde_json::from_reader(File::open(&from)?)?;

        let mut scores = sheet.scores();
        if let Some(jury_path) = jury {
            let jury_sheet: TallySheet = serde_json::from_reader(File::open(&jury_path)?)?;
            let factor = jury_scale_factor(sheet.total_votes, jury_sheet.total_votes);
            info!(factor, "merging scaled jury results");
            scores = scoring::merge_scaled(&scores, &jury_sheet.scores(), factor);
        }

        let standings = scoring::rank(&scores, &sheet.country_vote_counts);
        match output {
            Some(path) => dump_data_to_csv(&standings, &path)?,
            None => {
                for (position, standing) in standings.iter().enumerate() {
                    println!(
                        "{:>2}. {:<24} {:>5} pts ({} votes)",
                        position + 1,
                        standing.country,
                        standing.points,
                        standing.vote_count
                    );
                }
            }
        }
        Ok(())
    }
}
