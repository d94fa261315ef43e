//! Data contract shared between the voting engine and the vote store:
//! the ranked ballot wire format, the aggregated tally payloads and the
//! per-edition country catalog.
//!
//! Everything here is concerned with decoding externally-supplied data
//! into one normalized shape; the actual scoring and reveal logic lives
//! in `songfest-toolbox`.

pub mod ballot;
pub mod catalog;
pub mod tally;

pub use ballot::{Ballot, BallotError, BALLOT_SLOTS, POINTS};
pub use catalog::{Catalog, CatalogEntry, ClipRef};
pub use tally::{CountryTally, PointsBreakdown, TallySheet, UserBallot};

/// Countries are referred to by their display name throughout, the same
/// opaque string the vote store uses as a key.
pub type Country = String;
