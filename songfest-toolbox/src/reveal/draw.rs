use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::{ChaCha8Rng, ChaChaRng};

use ballot_lib::{ClipRef, Country};

use crate::scoring::{rank, top_n, Scores};

pub type Seed = <ChaChaRng as SeedableRng>::Seed;

/// Entries inside the top-N-by-points cut count as finalists.
pub const FINALIST_CUT: usize = 10;

/// First hop of the travel animation; each further hop is
/// [`TRAVEL_HOP_GROWTH`] longer.
pub const TRAVEL_FIRST_HOP: Duration = Duration::from_millis(80);
pub const TRAVEL_HOP_GROWTH: Duration = Duration::from_millis(10);

/// The travel runs for a duration drawn uniformly from this range.
pub const TRAVEL_MIN: Duration = Duration::from_millis(2300);
pub const TRAVEL_MAX: Duration = Duration::from_millis(3800);

/// Hold on the drawn entry before it is marked revealed.
pub const SETTLE_HOLD: Duration = Duration::from_millis(80);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawEvent {
    /// The highlight jumped to another not-yet-revealed entry.
    Hopped { highlight: Country },
    /// The travel settled on the drawn entry; play its clip if it has one.
    Settled {
        country: Country,
        finalist: bool,
        clip: Option<ClipRef>,
    },
    /// The drawn entry is now revealed and the draw is ready again.
    Revealed { country: Country, finalist: bool },
}

enum State {
    Idle,
    Traveling {
        target: Country,
        hop: Duration,
        elapsed: Duration,
        total: Duration,
    },
    Settling {
        target: Country,
    },
    Done,
}

/// Random finalist/eliminated reveal: draws alternate between the two
/// pools by the parity of how many entries are already revealed, with a
/// travel animation hopping across the unrevealed entries before each
/// draw settles.
///
/// The RNG is a seedable ChaCha so a rehearsed show replays identically.
pub struct DrawReveal {
    roster: Vec<Country>,
    finalists: BTreeSet<Country>,
    clips: BTreeMap<Country, ClipRef>,
    revealed: Vec<Country>,
    state: State,
    rng: ChaCha8Rng,
}

impl DrawReveal {
    /// `roster` is the display order (all entries on the page, voted for
    /// or not); `scores`/`vote_counts` decide the finalist cut.
    pub fn new(
        roster: Vec<Country>,
        scores: &Scores,
        vote_counts: &BTreeMap<Country, u64>,
        clips: BTreeMap<Country, ClipRef>,
        seed: Seed,
    ) -> Self {
        let finalists = top_n(&rank(scores, vote_counts), FINALIST_CUT)
            .into_iter()
            .collect();
        Self {
            roster,
            finalists,
            clips,
            revealed: Vec::new(),
            state: State::Idle,
            rng: ChaCha8Rng::from_seed(seed),
        }
    }

    pub fn is_finalist(&self, country: &str) -> bool {
        self.finalists.contains(country)
    }

    fn unrevealed(&self) -> Vec<Country> {
        self.roster
            .iter()
            .filter(|country| !self.revealed.contains(country))
            .cloned()
            .collect()
    }

    /// Draws the next target and begins the travel animation. No-op while
    /// a draw is in flight or everything is revealed.
    pub fn start(&mut self) -> bool {
        if !matches!(self.state, State::Idle) {
            return false;
        }
        let unrevealed = self.unrevealed();
        if unrevealed.is_empty() {
            return false;
        }

        // Even draws pull a finalist, odd draws an eliminated entry; an
        // empty preferred pool falls back to every unrevealed entry.
        let wants_finalist = self.revealed.len() % 2 == 0;
        let preferred: Vec<Country> = unrevealed
            .iter()
            .filter(|country| self.finalists.contains(*country) == wants_finalist)
            .cloned()
            .collect();
        let pool = if preferred.is_empty() {
            &unrevealed
        } else {
            &preferred
        };

        let target = pool
            .choose(&mut self.rng)
            .expect("pool is non-empty")
            .clone();
        let total = Duration::from_millis(
            self.rng
                .gen_range(TRAVEL_MIN.as_millis() as u64..=TRAVEL_MAX.as_millis() as u64),
        );
        self.state = State::Traveling {
            target,
            hop: TRAVEL_FIRST_HOP,
            elapsed: Duration::ZERO,
            total,
        };
        true
    }

    pub fn is_revealing(&self) -> bool {
        matches!(self.state, State::Traveling { .. } | State::Settling { .. })
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    pub fn next_delay(&self) -> Option<Duration> {
        match &self.state {
            State::Idle | State::Done => None,
            State::Traveling { hop, .. } => Some(*hop),
            State::Settling { .. } => Some(SETTLE_HOLD),
        }
    }

    pub fn tick(&mut self) -> Option<DrawEvent> {
        match &mut self.state {
            State::Idle | State::Done => None,
            State::Traveling {
                target,
                hop,
                elapsed,
                total,
            } => {
                *elapsed += *hop;
                if elapsed >= total {
                    let country = target.clone();
                    let finalist = self.finalists.contains(&country);
                    let clip = self.clips.get(&country).cloned();
                    self.state = State::Settling {
                        target: country.clone(),
                    };
                    return Some(DrawEvent::Settled {
                        country,
                        finalist,
                        clip,
                    });
                }
                *hop += TRAVEL_HOP_GROWTH;
                let highlight = self
                    .unrevealed()
                    .choose(&mut self.rng)
                    .expect("travel only runs with unrevealed entries left")
                    .clone();
                Some(DrawEvent::Hopped { highlight })
            }
            State::Settling { target } => {
                let country = target.clone();
                self.revealed.push(country.clone());
                self.state = if self.revealed.len() == self.roster.len() {
                    State::Done
                } else {
                    State::Idle
                };
                Some(DrawEvent::Revealed {
                    finalist: self.finalists.contains(&country),
                    country,
                })
            }
        }
    }

    pub fn revealed(&self) -> &[Country] {
        &self.revealed
    }

    pub fn remaining(&self) -> usize {
        self.roster.len() - self.revealed.len()
    }

    pub fn reset(&mut self) {
        self.revealed.clear();
        self.state = State::Idle;
    }
}
