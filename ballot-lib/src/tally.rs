use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ballot::{Ballot, BALLOT_SLOTS, POINTS};
use crate::Country;

/// Per-point-value ballot counts, ordered like [`POINTS`] (the 12-point
/// count first, the 1-point count last).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointsBreakdown {
    pub total: u64,
    pub per_point: [u64; BALLOT_SLOTS],
}

impl PointsBreakdown {
    /// Decodes the store's `"total,12ct,10ct,...,1ct"` encoding. Fields
    /// that are missing or fail to parse count as zero.
    fn parse(encoded: &str) -> Self {
        let mut fields = encoded
            .split(',')
            .map(|field| field.trim().parse::<u64>().unwrap_or(0));
        let total = fields.next().unwrap_or(0);
        let mut per_point = [0u64; BALLOT_SLOTS];
        for (count, field) in per_point.iter_mut().zip(fields) {
            *count = field;
        }
        Self { total, per_point }
    }

    fn encode(&self) -> String {
        let mut out = self.total.to_string();
        for count in &self.per_point {
            out.push(',');
            out.push_str(&count.to_string());
        }
        out
    }

    /// How many ballots awarded exactly `point_value` points.
    pub fn count_for(&self, point_value: u64) -> u64 {
        POINTS
            .iter()
            .position(|&p| p == point_value)
            .map(|i| self.per_point[i])
            .unwrap_or(0)
    }

    /// Points contributed by all ballots that awarded `point_value`.
    pub fn contribution_for(&self, point_value: u64) -> u64 {
        self.count_for(point_value) * point_value
    }
}

/// A country's accumulated points as returned by the vote store.
///
/// Breakdown-capable editions encode per-point counts in a delimited
/// string, older ones return a bare number; both normalize here so the
/// engine only ever sees one shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CountryTally {
    Total(u64),
    Breakdown(PointsBreakdown),
}

impl Default for CountryTally {
    fn default() -> Self {
        CountryTally::Total(0)
    }
}

impl CountryTally {
    pub fn points(&self) -> u64 {
        match self {
            CountryTally::Total(points) => *points,
            CountryTally::Breakdown(breakdown) => breakdown.total,
        }
    }

    pub fn breakdown(&self) -> Option<&PointsBreakdown> {
        match self {
            CountryTally::Total(_) => None,
            CountryTally::Breakdown(breakdown) => Some(breakdown),
        }
    }
}

impl Serialize for CountryTally {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CountryTally::Total(points) => serializer.serialize_u64(*points),
            CountryTally::Breakdown(breakdown) => serializer.serialize_str(&breakdown.encode()),
        }
    }
}

impl<'de> Deserialize<'de> for CountryTally {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TallyVisitor;

        impl<'de> Visitor<'de> for TallyVisitor {
            type Value = CountryTally;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a point total or a comma-separated breakdown string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(CountryTally::Total(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(CountryTally::Total(v.try_into().unwrap_or(0)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                if v.is_finite() && v >= 0.0 {
                    Ok(CountryTally::Total(v as u64))
                } else {
                    Ok(CountryTally::Total(0))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(CountryTally::Breakdown(PointsBreakdown::parse(v)))
            }

            // Anything else the store might leak is coerced to zero rather
            // than failing the whole sheet.
            fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
                Ok(CountryTally::Total(0))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(CountryTally::Total(0))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(CountryTally::Total(0))
            }
        }

        // Knowing the data type alone is enough to discriminate the
        // variants, so deserialize_any avoids a tagged wrapper the wire
        // format never had.
        deserializer.deserialize_any(TallyVisitor)
    }
}

/// The authenticated voter's own ballot as echoed back by the store.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserBallot {
    #[serde(default, rename = "userId")]
    pub voter: String,
    #[serde(rename = "votes")]
    pub ballot: Ballot,
}

/// One edition's aggregate results resource.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TallySheet {
    #[serde(default, rename = "countryPoints")]
    pub country_points: BTreeMap<Country, CountryTally>,
    /// Ballots mentioning the country anywhere; the ranking tie-breaker.
    #[serde(default, rename = "countryVoteCounts")]
    pub country_vote_counts: BTreeMap<Country, u64>,
    #[serde(default, rename = "totalVotes")]
    pub total_votes: u64,
    #[serde(default, rename = "userVote", skip_serializing_if = "Option::is_none")]
    pub user_ballot: Option<UserBallot>,
    /// Set by the store while an eventually-consistent read has not yet
    /// resolved the caller's identity.
    #[serde(default, rename = "authPending")]
    pub auth_pending: bool,
}

impl TallySheet {
    pub fn points_of(&self, country: &str) -> u64 {
        self.country_points
            .get(country)
            .map(CountryTally::points)
            .unwrap_or(0)
    }

    pub fn vote_count_of(&self, country: &str) -> u64 {
        self.country_vote_counts.get(country).copied().unwrap_or(0)
    }

    /// Normalized country → total points view.
    pub fn scores(&self) -> BTreeMap<Country, u64> {
        self.country_points
            .iter()
            .map(|(country, tally)| (country.clone(), tally.points()))
            .collect()
    }

    /// Per-point breakdowns; totals without one come back with zeroed
    /// counts, which a distribution reveal treats as nothing outstanding.
    pub fn breakdowns(&self) -> BTreeMap<Country, PointsBreakdown> {
        self.country_points
            .iter()
            .map(|(country, tally)| {
                let breakdown = tally.breakdown().copied().unwrap_or(PointsBreakdown {
                    total: tally.points(),
                    per_point: [0; BALLOT_SLOTS],
                });
                (country.clone(), breakdown)
            })
            .collect()
    }

    pub fn has_breakdowns(&self) -> bool {
        self.country_points
            .values()
            .any(|tally| tally.breakdown().is_some())
    }
}
