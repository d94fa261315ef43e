mod standings;

use std::collections::BTreeMap;

use itertools::Itertools;

use ballot_lib::{Ballot, Country};

pub use standings::{
    jury_scale_factor, merge_scaled, rank, top_n, SortOrder, Standing, JURY_WEIGHT,
};

/// Running country → point total aggregate. BTreeMap keeps iteration
/// deterministic across recomputes.
pub type Scores = BTreeMap<Country, u64>;

/// Point totals a single ballot awards, keyed by country.
pub fn contribution(ballot: &Ballot) -> Scores {
    ballot
        .scored()
        .map(|(country, points)| (country.clone(), points))
        .collect()
}

/// Total points a ballot hands out across all of its filled slots.
pub fn ballot_points(ballot: &Ballot) -> u64 {
    ballot.scored().map(|(_, points)| points).sum()
}

/// Raw vote counts (how many ballots mention each country anywhere)
/// recomputed from a pile of ballots. This is the ranking tie-breaker the
/// store normally serves precomputed.
pub fn vote_counts(ballots: &[Ballot]) -> BTreeMap<Country, u64> {
    ballots
        .iter()
        .flat_map(|ballot| ballot.scored().map(|(country, _)| country.clone()))
        .counts()
        .into_iter()
        .map(|(country, count)| (country, count as u64))
        .collect()
}

/// Replaces a voter's contribution in the running aggregate: the previous
/// ballot's points come out, the next ballot's points go in.
///
/// Subtraction saturates at zero so a duplicate removal (stale cache,
/// racing refresh) can never drive a total negative. Countries unknown to
/// the aggregate are simply inserted; validation happens at the store.
pub fn apply_ballot(scores: &mut Scores, previous: Option<&Ballot>, next: &Ballot) {
    if let Some(previous) = previous {
        for (country, points) in previous.scored() {
            if let Some(total) = scores.get_mut(country) {
                *total = total.saturating_sub(points);
            }
        }
    }
    for (country, points) in next.scored() {
        *scores.entry(country.clone()).or_default() += points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_lib::{BALLOT_SLOTS, POINTS};
    use proptest::prelude::*;
    use test_strategy::proptest;

    fn ballot(countries: &[&str]) -> Ballot {
        Ballot::from_slots(countries.iter().map(|c| Some(c.to_string()))).unwrap()
    }

    fn arb_ballot() -> impl Strategy<Value = Ballot> {
        proptest::sample::subsequence(
            (0..BALLOT_SLOTS).map(|i| format!("country-{}", i)).collect::<Vec<_>>(),
            0..=BALLOT_SLOTS,
        )
        .prop_map(|countries| Ballot::from_slots(countries.into_iter().map(Some)).unwrap())
    }

    #[test]
    fn first_submission_awards_slot_points() {
        let mut scores = Scores::new();
        apply_ballot(&mut scores, None, &ballot(&["A", "B"]));
        assert_eq!(scores["A"], 12);
        assert_eq!(scores["B"], 10);
    }

    #[test]
    fn resubmission_replaces_the_old_contribution() {
        let mut scores = Scores::new();
        let first = ballot(&["A", "B"]);
        apply_ballot(&mut scores, None, &first);

        // Same voter swaps the top two slots.
        apply_ballot(&mut scores, Some(&first), &ballot(&["B", "A"]));
        assert_eq!(scores["A"], 10);
        assert_eq!(scores["B"], 12);
    }

    #[test]
    fn vote_counts_tally_mentions_across_ballots() {
        let ballots = vec![ballot(&["A", "B"]), ballot(&["B", "A"]), ballot(&["B"])];
        let counts = vote_counts(&ballots);
        assert_eq!(counts["A"], 2);
        assert_eq!(counts["B"], 3);
        assert!(counts.get("C").is_none());
    }

    #[test]
    fn retracting_from_an_empty_aggregate_stays_at_zero() {
        let mut scores = Scores::from([("A".to_string(), 5)]);
        // The previous ballot claims more points than the aggregate holds.
        apply_ballot(&mut scores, Some(&ballot(&["A"])), &Ballot::empty());
        assert_eq!(scores["A"], 0);
    }

    #[proptest]
    fn points_conservation(#[strategy(arb_ballot())] ballot: Ballot) {
        let expected: u64 = POINTS[..ballot.filled()].iter().sum();
        prop_assert_eq!(ballot_points(&ballot), expected);
        prop_assert_eq!(contribution(&ballot).values().sum::<u64>(), expected);
    }

    #[proptest]
    fn resubmitting_the_same_ballot_is_idempotent(
        #[strategy(arb_ballot())] first: Ballot,
        #[strategy(arb_ballot())] second: Ballot,
    ) {
        let mut scores = Scores::new();
        apply_ballot(&mut scores, None, &first);
        apply_ballot(&mut scores, Some(&first), &second);
        let snapshot = scores.clone();

        apply_ballot(&mut scores, Some(&second), &second);
        prop_assert_eq!(scores, snapshot);
    }

    #[proptest]
    fn totals_never_go_negative(
        #[strategy(proptest::collection::vec(arb_ballot(), 1..6))] ballots: Vec<Ballot>,
    ) {
        let mut scores = Scores::new();
        let mut previous: Option<Ballot> = None;
        for next in ballots {
            apply_ballot(&mut scores, previous.as_ref(), &next);
            previous = Some(next);
        }
        // Retract twice in a row to simulate a duplicate-removal bug.
        if let Some(last) = previous {
            apply_ballot(&mut scores, Some(&last), &Ballot::empty());
            apply_ballot(&mut scores, Some(&last), &Ballot::empty());
        }
        // u64 cannot underflow past the saturating clamp; reaching this
        // point without a panic is the property.
        prop_assert!(scores.values().all(|&points| points < u64::MAX / 2));
    }
}
