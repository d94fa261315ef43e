use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use structopt::StructOpt;
use tracing::{debug, warn};

use ballot_lib::{Catalog, ClipRef, Country, TallySheet};
use songfest_toolbox::reveal::{
    Bucket, DistributionReveal, DrawEvent, DrawReveal, Seed, SequentialEvent, SequentialReveal,
};
use songfest_toolbox::scoring::{SortOrder, Standing};

use super::Error;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Reveal {
    /// Reveal entries one by one, then re-sort by final points
    Sequential {
        /// Tally sheet json path
        from: PathBuf,
    },
    /// Distribute points bucket by bucket: 1-8 grouped, then 10, then 12
    Distribution {
        /// Tally sheet json path (needs per-point breakdowns)
        from: PathBuf,
        /// Animation speed in milliseconds per credit
        #[structopt(long, default_value = "750")]
        speed_ms: u64,
        /// Credit the biggest outstanding contribution first
        #[structopt(long)]
        descending: bool,
    },
    /// Randomly alternate finalist and eliminated reveals
    Draw {
        /// Tally sheet json path
        from: PathBuf,
        /// Edition catalog with performer/song/clip data
        #[structopt(long)]
        catalog: Option<PathBuf>,
        /// Seed for a reproducible draw order
        #[structopt(long)]
        seed: Option<u64>,
    },
}

fn load_sheet(path: &Path) -> Result<TallySheet, Error> {
    Ok(serde_json::from_reader(File::open(path)?)?)
}

fn print_board(board: &[Standing]) {
    for (position, standing) in board.iter().enumerate() {
        println!(
            "{:>2}. {:<24} {:>5} pts",
            position + 1,
            standing.country,
            standing.points
        );
    }
}

fn bucket_label(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::Grouped => "1-8",
        Bucket::Ten => "10",
        Bucket::Twelve => "12",
    }
}

impl Reveal {
    pub fn exec(self) -> Result<(), Error> {
        match self {
            Reveal::Sequential { from } => run_sequential(&load_sheet(&from)?),
            Reveal::Distribution {
                from,
                speed_ms,
                descending,
            } => run_distribution(&load_sheet(&from)?, speed_ms, descending),
            Reveal::Draw {
                from,
                catalog,
                seed,
            } => {
                let catalog = catalog.map(|path| Catalog::load(&path)).transpose()?;
                run_draw(&load_sheet(&from)?, catalog.as_ref(), seed)
            }
        }
    }
}

fn run_sequential(sheet: &TallySheet) -> Result<(), Error> {
    let mut reveal = SequentialReveal::new(&sheet.scores(), &sheet.country_vote_counts);
    reveal.start();
    while let Some(delay) = reveal.next_delay() {
        thread::sleep(delay);
        match reveal.tick() {
            Some(SequentialEvent::Revealed { country, position }) => {
                println!("#{:<3} {}", position + 1, country);
            }
            Some(SequentialEvent::Sorted) => {
                println!("--- final standings ---");
                print_board(reveal.board());
            }
            None => break,
        }
    }
    Ok(())
}

fn run_distribution(sheet: &TallySheet, speed_ms: u64, descending: bool) -> Result<(), Error> {
    if !sheet.has_breakdowns() {
        warn!("tally sheet has no per-point breakdowns, nothing to distribute");
    }
    let order = if descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    let mut reveal = DistributionReveal::new(
        sheet.breakdowns(),
        &sheet.country_vote_counts,
        order,
        Duration::from_millis(speed_ms),
    );
    reveal.start();
    while let Some(delay) = reveal.next_delay() {
        thread::sleep(delay);
        if let Some(event) = reveal.tick() {
            println!(
                "[{:>3}] {:<24} +{} -> {}",
                bucket_label(event.bucket),
                event.country,
                event.amount,
                event.new_total
            );
        }
    }
    if reveal.is_complete() {
        println!("--- distribution complete ---");
        print_board(reveal.board());
    }
    Ok(())
}

fn run_draw(sheet: &TallySheet, catalog: Option<&Catalog>, seed: Option<u64>) -> Result<(), Error> {
    let roster: Vec<Country> = match catalog {
        Some(catalog) => catalog.countries().cloned().collect(),
        None => sheet.country_points.keys().cloned().collect(),
    };
    let clips: BTreeMap<Country, ClipRef> = catalog
        .map(|catalog| {
            catalog
                .iter()
                .filter_map(|(country, entry)| {
                    entry.clip.clone().map(|clip| (country.clone(), clip))
                })
                .collect()
        })
        .unwrap_or_default();

    let seed = match seed {
        Some(value) => {
            let mut seed = Seed::default();
            seed[..8].copy_from_slice(&value.to_le_bytes());
            seed
        }
        None => rand::random(),
    };

    let mut draw = DrawReveal::new(
        roster,
        &sheet.scores(),
        &sheet.country_vote_counts,
        clips,
        seed,
    );

    while draw.start() {
        while let Some(delay) = draw.next_delay() {
            thread::sleep(delay);
            match draw.tick() {
                Some(DrawEvent::Hopped { highlight }) => debug!(%highlight, "travelling"),
                Some(DrawEvent::Settled {
                    country,
                    finalist,
                    clip,
                }) => {
                    println!(
                        "... settled on {} ({})",
                        country,
                        if finalist { "FINALIST" } else { "eliminated" }
                    );
                    if let Some(clip) = clip {
                        println!(
                            "    clip {} [{}s..{}s]",
                            clip.video_id, clip.start_secs, clip.end_secs
                        );
                    }
                }
                Some(DrawEvent::Revealed { country, finalist }) => {
                    println!(
                        "revealed {}/{}: {} ({})",
                        draw.revealed().len(),
                        draw.revealed().len() + draw.remaining(),
                        country,
                        if finalist { "FINALIST" } else { "eliminated" }
                    );
                }
                None => break,
            }
        }
    }
    Ok(())
}
