use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use ballot_lib::{Country, PointsBreakdown};

use crate::scoring::{SortOrder, Standing};

/// Added on top of the configured animation speed for every tick, so the
/// board finishes moving before the next credit lands.
pub const DISTRIBUTION_BUFFER: Duration = Duration::from_millis(500);

/// Point buckets in their fixed processing order: the 1–8 values are
/// distributed as one combined pass, then the 10s, then the 12s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    Grouped,
    Ten,
    Twelve,
}

impl Bucket {
    pub const ORDER: [Bucket; 3] = [Bucket::Grouped, Bucket::Ten, Bucket::Twelve];

    pub fn point_values(self) -> &'static [u64] {
        match self {
            Bucket::Grouped => &[1, 2, 3, 4, 5, 6, 7, 8],
            Bucket::Ten => &[10],
            Bucket::Twelve => &[12],
        }
    }

    fn next(self) -> Option<Bucket> {
        match self {
            Bucket::Grouped => Some(Bucket::Ten),
            Bucket::Ten => Some(Bucket::Twelve),
            Bucket::Twelve => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionEvent {
    pub country: Country,
    pub bucket: Bucket,
    pub amount: u64,
    pub new_total: u64,
}

enum State {
    Idle,
    // Invariant: the queue is never stored empty.
    Distributing { bucket: Bucket, queue: VecDeque<Country> },
    Done,
}

/// Credits each country's outstanding contribution one bucket at a time,
/// re-sorting the running board after every credit.
pub struct DistributionReveal {
    board: Vec<Standing>,
    breakdowns: BTreeMap<Country, PointsBreakdown>,
    order: SortOrder,
    speed: Duration,
    state: State,
    complete: bool,
}

impl DistributionReveal {
    pub fn new(
        breakdowns: BTreeMap<Country, PointsBreakdown>,
        vote_counts: &BTreeMap<Country, u64>,
        order: SortOrder,
        speed: Duration,
    ) -> Self {
        let board = breakdowns
            .keys()
            .map(|country| Standing {
                country: country.clone(),
                points: 0,
                vote_count: vote_counts.get(country).copied().unwrap_or(0),
            })
            .collect();
        Self {
            board,
            breakdowns,
            order,
            speed,
            state: State::Idle,
            complete: false,
        }
    }

    /// Points `country` still has coming from `bucket`.
    fn outstanding(&self, country: &str, bucket: Bucket) -> u64 {
        let Some(breakdown) = self.breakdowns.get(country) else {
            return 0;
        };
        bucket
            .point_values()
            .iter()
            .map(|&value| breakdown.contribution_for(value))
            .sum()
    }

    /// Countries with an outstanding contribution for `bucket`, ordered by
    /// that contribution per the configured toggle, ties by vote count.
    fn queue_for(&self, bucket: Bucket) -> VecDeque<Country> {
        let mut entries: Vec<(Country, u64, u64)> = self
            .breakdowns
            .keys()
            .filter_map(|country| {
                let outstanding = self.outstanding(country, bucket);
                (outstanding > 0).then(|| {
                    let vote_count = self
                        .board
                        .iter()
                        .find(|row| &row.country == country)
                        .map(|row| row.vote_count)
                        .unwrap_or(0);
                    (country.clone(), outstanding, vote_count)
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            let by_amount = match self.order {
                SortOrder::Ascending => a.1.cmp(&b.1),
                SortOrder::Descending => b.1.cmp(&a.1),
            };
            by_amount.then(b.2.cmp(&a.2))
        });
        entries.into_iter().map(|(country, _, _)| country).collect()
    }

    fn advance_from(&mut self, current: Option<Bucket>) {
        let mut next = match current {
            None => Some(Bucket::Grouped),
            Some(bucket) => bucket.next(),
        };
        while let Some(bucket) = next {
            let queue = self.queue_for(bucket);
            if !queue.is_empty() {
                self.state = State::Distributing { bucket, queue };
                return;
            }
            next = bucket.next();
        }
        // Ran past the 12-point bucket: the distribution is complete and
        // stays locked until reset.
        self.complete = true;
        self.state = State::Done;
    }

    /// Begins distributing. No-op while in flight or once complete.
    pub fn start(&mut self) -> bool {
        if !matches!(self.state, State::Idle) {
            return false;
        }
        self.advance_from(None);
        true
    }

    pub fn is_distributing(&self) -> bool {
        matches!(self.state, State::Distributing { .. })
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn current_bucket(&self) -> Option<Bucket> {
        match &self.state {
            State::Distributing { bucket, .. } => Some(*bucket),
            _ => None,
        }
    }

    pub fn next_delay(&self) -> Option<Duration> {
        match self.state {
            State::Distributing { .. } => Some(self.speed + DISTRIBUTION_BUFFER),
            _ => None,
        }
    }

    pub fn tick(&mut self) -> Option<DistributionEvent> {
        let (bucket, country) = match &mut self.state {
            State::Distributing { bucket, queue } => {
                let bucket = *bucket;
                let country = queue.pop_front()?;
                (bucket, country)
            }
            _ => return None,
        };

        let amount = self.outstanding(&country, bucket);
        let new_total = {
            let row = self
                .board
                .iter_mut()
                .find(|row| row.country == country)
                .expect("every queued country has a board row");
            row.points += amount;
            row.points
        };
        self.board.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.vote_count.cmp(&a.vote_count))
        });

        let exhausted = matches!(&self.state, State::Distributing { queue, .. } if queue.is_empty());
        if exhausted {
            self.advance_from(Some(bucket));
        }

        Some(DistributionEvent {
            country,
            bucket,
            amount,
            new_total,
        })
    }

    pub fn board(&self) -> &[Standing] {
        &self.board
    }

    pub fn reset(&mut self) {
        for row in &mut self.board {
            row.points = 0;
        }
        self.board.sort_by(|a, b| a.country.cmp(&b.country));
        self.state = State::Idle;
        self.complete = false;
    }
}
