use std::collections::BTreeMap;

use serde::Serialize;

use ballot_lib::Country;

use super::Scores;

/// The public pool must outnumber the jury pool by this factor per unit of
/// jury scaling. The constant is product policy, kept verbatim.
pub const JURY_WEIGHT: u64 = 4;

/// One row of the ranked board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub country: Country,
    pub points: u64,
    /// Ballots mentioning the country anywhere; breaks point ties.
    pub vote_count: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Orders countries by points descending, ties broken by raw vote count
/// descending. The sort is stable, so equal rows keep the deterministic
/// BTreeMap input order across re-runs.
pub fn rank(scores: &Scores, vote_counts: &BTreeMap<Country, u64>) -> Vec<Standing> {
    let mut standings: Vec<Standing> = scores
        .iter()
        .map(|(country, &points)| Standing {
            country: country.clone(),
            points,
            vote_count: vote_counts.get(country).copied().unwrap_or(0),
        })
        .collect();
    standings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.vote_count.cmp(&a.vote_count))
    });
    standings
}

/// Countries currently inside the top-`n` cut, in rank order.
pub fn top_n(standings: &[Standing], n: usize) -> Vec<Country> {
    standings
        .iter()
        .take(n)
        .map(|standing| standing.country.clone())
        .collect()
}

/// Integer scale factor applied to jury points before merging with the
/// public pool: `floor(public / (JURY_WEIGHT × jury))`, never below one,
/// so neither pool swamps the other on raw ballot count alone.
pub fn jury_scale_factor(public_total_votes: u64, jury_total_votes: u64) -> u64 {
    if jury_total_votes == 0 {
        return 1;
    }
    (public_total_votes / (JURY_WEIGHT * jury_total_votes)).max(1)
}

/// Combines the public board with a jury board scaled by `factor`.
pub fn merge_scaled(public: &Scores, jury: &Scores, factor: u64) -> Scores {
    let mut combined = public.clone();
    for (country, &points) in jury {
        *combined.entry(country.clone()).or_default() += points * factor;
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(entries: &[(&str, u64)]) -> Scores {
        entries
            .iter()
            .map(|(country, points)| (country.to_string(), *points))
            .collect()
    }

    #[test]
    fn orders_by_points_then_vote_count() {
        let points = scores(&[("A", 10), ("B", 10), ("C", 25)]);
        let counts = scores(&[("A", 5), ("B", 7)]);

        let standings = rank(&points, &counts);
        let order: Vec<&str> = standings.iter().map(|s| s.country.as_str()).collect();
        assert_eq!(order, ["C", "B", "A"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let points = scores(&[("B", 10), ("A", 10), ("C", 10)]);
        let counts = BTreeMap::new();

        let first = rank(&points, &counts);
        let second = rank(&points, &counts);
        assert_eq!(first, second);

        // BTreeMap feeds the stable sort alphabetically.
        let order: Vec<&str> = first.iter().map(|s| s.country.as_str()).collect();
        assert_eq!(order, ["A", "B", "C"]);
    }

    #[test]
    fn top_n_respects_the_tie_break() {
        let points = scores(&[("A", 10), ("B", 10), ("C", 5)]);
        let counts = scores(&[("B", 9), ("A", 1)]);
        let standings = rank(&points, &counts);
        assert_eq!(top_n(&standings, 2), ["B", "A"]);
    }

    #[test]
    fn jury_factor_floors_and_never_drops_below_one() {
        assert_eq!(jury_scale_factor(400, 50), 2);
        assert_eq!(jury_scale_factor(399, 50), 1);
        assert_eq!(jury_scale_factor(10, 50), 1);
        assert_eq!(jury_scale_factor(400, 0), 1);
    }

    #[test]
    fn scaled_jury_points_merge_into_the_public_board() {
        let public = scores(&[("X", 30)]);
        let jury = scores(&[("X", 100), ("Y", 7)]);

        let combined = merge_scaled(&public, &jury, jury_scale_factor(400, 50));
        assert_eq!(combined["X"], 230);
        assert_eq!(combined["Y"], 14);
    }
}
