use std::collections::BTreeMap;
use std::time::Duration;

use ballot_lib::Country;

use crate::scoring::{Scores, Standing};

/// One entry is disclosed per tick at this pace.
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(550);

/// Pause between the last disclosure and the final re-sort of the board.
pub const SORT_PAUSE: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequentialEvent {
    Revealed { country: Country, position: usize },
    /// The fully-revealed board was re-sorted by final points.
    Sorted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Revealing,
    Sorting,
    Done,
}

/// Reveals the board one entry at a time in its initial display order,
/// then re-sorts by points (ties by vote count) after a short pause.
pub struct SequentialReveal {
    board: Vec<Standing>,
    cursor: usize,
    state: State,
}

impl SequentialReveal {
    /// The board starts in the aggregate's own (alphabetical) order; the
    /// points stay attached but count as hidden until the cursor passes.
    pub fn new(scores: &Scores, vote_counts: &BTreeMap<Country, u64>) -> Self {
        let board = scores
            .iter()
            .map(|(country, &points)| Standing {
                country: country.clone(),
                points,
                vote_count: vote_counts.get(country).copied().unwrap_or(0),
            })
            .collect();
        Self {
            board,
            cursor: 0,
            state: State::Idle,
        }
    }

    /// Begins the run. No-op while a run is in flight or finished, and on
    /// an empty board.
    pub fn start(&mut self) -> bool {
        if self.state != State::Idle || self.board.is_empty() {
            return false;
        }
        self.state = State::Revealing;
        true
    }

    pub fn is_revealing(&self) -> bool {
        matches!(self.state, State::Revealing | State::Sorting)
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// How long the driver should wait before the next [`tick`](Self::tick);
    /// `None` means the machine is at rest.
    pub fn next_delay(&self) -> Option<Duration> {
        match self.state {
            State::Idle | State::Done => None,
            State::Revealing => Some(REVEAL_INTERVAL),
            State::Sorting => Some(SORT_PAUSE),
        }
    }

    pub fn tick(&mut self) -> Option<SequentialEvent> {
        match self.state {
            State::Idle | State::Done => None,
            State::Revealing => {
                let position = self.cursor;
                let country = self.board[position].country.clone();
                self.cursor += 1;
                if self.cursor == self.board.len() {
                    self.state = State::Sorting;
                }
                Some(SequentialEvent::Revealed { country, position })
            }
            State::Sorting => {
                self.board.sort_by(|a, b| {
                    b.points
                        .cmp(&a.points)
                        .then(b.vote_count.cmp(&a.vote_count))
                });
                self.state = State::Done;
                Some(SequentialEvent::Sorted)
            }
        }
    }

    /// Steps the cursor back over the last disclosure; manual correction,
    /// refused while a run is in flight.
    pub fn back(&mut self) -> bool {
        if self.is_revealing() || self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn board(&self) -> &[Standing] {
        &self.board
    }

    pub fn revealed_count(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.board.sort_by(|a, b| a.country.cmp(&b.country));
        self.cursor = 0;
        self.state = State::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reveal(points: &[(&str, u64)], counts: &[(&str, u64)]) -> SequentialReveal {
        let scores: Scores = points
            .iter()
            .map(|(c, p)| (c.to_string(), *p))
            .collect();
        let vote_counts: BTreeMap<Country, u64> =
            counts.iter().map(|(c, n)| (c.to_string(), *n)).collect();
        SequentialReveal::new(&scores, &vote_counts)
    }

    fn run_to_completion(reveal: &mut SequentialReveal) -> Vec<SequentialEvent> {
        let mut events = Vec::new();
        assert!(reveal.start());
        while reveal.next_delay().is_some() {
            events.push(reveal.tick().unwrap());
        }
        events
    }

    #[test]
    fn reveals_every_entry_exactly_once_then_sorts() {
        let mut reveal = reveal(
            &[("A", 5), ("B", 20), ("C", 11)],
            &[("A", 1), ("B", 4), ("C", 2)],
        );
        let events = run_to_completion(&mut reveal);

        let revealed: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                SequentialEvent::Revealed { country, .. } => Some(country.as_str()),
                SequentialEvent::Sorted => None,
            })
            .collect();
        assert_eq!(revealed, ["A", "B", "C"]);
        assert_eq!(events.last(), Some(&SequentialEvent::Sorted));

        assert_eq!(reveal.revealed_count(), reveal.board().len());
        assert!(reveal.is_done());

        let order: Vec<&str> = reveal.board().iter().map(|s| s.country.as_str()).collect();
        assert_eq!(order, ["B", "C", "A"]);
    }

    #[test]
    fn final_sort_breaks_ties_by_vote_count() {
        let mut reveal = reveal(&[("A", 10), ("B", 10)], &[("A", 5), ("B", 7)]);
        run_to_completion(&mut reveal);
        let order: Vec<&str> = reveal.board().iter().map(|s| s.country.as_str()).collect();
        assert_eq!(order, ["B", "A"]);
    }

    #[test]
    fn start_is_a_no_op_while_revealing() {
        let mut reveal = reveal(&[("A", 5), ("B", 20)], &[]);
        assert!(reveal.start());
        reveal.tick();
        let cursor = reveal.revealed_count();

        assert!(!reveal.start());
        assert_eq!(reveal.revealed_count(), cursor);
    }

    #[test]
    fn tick_at_rest_does_nothing() {
        let mut reveal = reveal(&[("A", 5)], &[]);
        assert_eq!(reveal.tick(), None);

        run_to_completion(&mut reveal);
        assert_eq!(reveal.tick(), None);
        assert!(!reveal.start());
    }

    #[test]
    fn empty_board_never_starts() {
        let mut reveal = reveal(&[], &[]);
        assert!(!reveal.start());
        assert_eq!(reveal.next_delay(), None);
    }

    #[test]
    fn back_steps_over_the_last_disclosure_only_at_rest() {
        let mut reveal = reveal(&[("A", 5), ("B", 20)], &[]);
        assert!(!reveal.back());

        assert!(reveal.start());
        assert!(!reveal.back());

        while reveal.next_delay().is_some() {
            reveal.tick();
        }
        assert!(reveal.back());
        assert_eq!(reveal.revealed_count(), 1);
    }

    #[test]
    fn reset_restores_the_initial_order() {
        let mut reveal = reveal(&[("A", 5), ("B", 20)], &[]);
        run_to_completion(&mut reveal);

        reveal.reset();
        assert_eq!(reveal.revealed_count(), 0);
        assert!(!reveal.is_done());
        let order: Vec<&str> = reveal.board().iter().map(|s| s.country.as_str()).collect();
        assert_eq!(order, ["A", "B"]);
        assert!(reveal.start());
    }
}
