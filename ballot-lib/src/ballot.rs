use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::Country;

/// A ballot always has this many slots, whether or not they are filled.
pub const BALLOT_SLOTS: usize = 10;

/// Points awarded by slot position, top slot first.
pub const POINTS: [u64; BALLOT_SLOTS] = [12, 10, 8, 7, 6, 5, 4, 3, 2, 1];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BallotError {
    #[error("country {0:?} appears in more than one slot")]
    DuplicateCountry(Country),
    #[error("slot index {0} is out of range")]
    SlotOutOfRange(usize),
    #[error("a ballot has at most {BALLOT_SLOTS} slots")]
    TooManySlots,
    #[error("no empty slot left")]
    Full,
}

/// One voter's ranked list of up to ten countries.
///
/// Slot `i` is worth `POINTS[i]`; a country can occupy at most one slot.
/// All mutation goes through methods that preserve that invariant, so a
/// reorder can never double count a country.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ballot {
    slots: [Option<Country>; BALLOT_SLOTS],
}

impl Ballot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a ballot from at most [`BALLOT_SLOTS`] slots, rejecting
    /// duplicate countries.
    pub fn from_slots<I>(slots: I) -> Result<Self, BallotError>
    where
        I: IntoIterator<Item = Option<Country>>,
    {
        let mut ballot = Self::default();
        for (i, slot) in slots.into_iter().enumerate() {
            if i >= BALLOT_SLOTS {
                return Err(BallotError::TooManySlots);
            }
            if let Some(country) = slot {
                if ballot.slot_of(&country).is_some() {
                    return Err(BallotError::DuplicateCountry(country));
                }
                ballot.slots[i] = Some(country);
            }
        }
        Ok(ballot)
    }

    pub fn slot_of(&self, country: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_deref() == Some(country))
    }

    pub fn get(&self, slot: usize) -> Option<&Country> {
        self.slots.get(slot).and_then(|slot| slot.as_ref())
    }

    pub fn slots(&self) -> &[Option<Country>; BALLOT_SLOTS] {
        &self.slots
    }

    /// Non-empty slots paired with the points their position is worth.
    pub fn scored(&self) -> impl Iterator<Item = (&Country, u64)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|country| (country, POINTS[i])))
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_none())
    }

    /// Points the next "add to first empty slot" action would award.
    pub fn next_points(&self) -> Option<u64> {
        self.first_empty().map(|i| POINTS[i])
    }

    /// Puts `country` into `slot`, removing it from any slot it already
    /// occupies first. Returns the entry the target slot previously held.
    pub fn place(&mut self, slot: usize, country: Country) -> Result<Option<Country>, BallotError> {
        if slot >= BALLOT_SLOTS {
            return Err(BallotError::SlotOutOfRange(slot));
        }
        if let Some(old) = self.slot_of(&country) {
            self.slots[old] = None;
        }
        Ok(std::mem::replace(&mut self.slots[slot], Some(country)))
    }

    /// Swaps two slots wholesale: both entries leave their old slots and
    /// re-enter at the new ones in one step.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), BallotError> {
        if a >= BALLOT_SLOTS {
            return Err(BallotError::SlotOutOfRange(a));
        }
        if b >= BALLOT_SLOTS {
            return Err(BallotError::SlotOutOfRange(b));
        }
        self.slots.swap(a, b);
        Ok(())
    }

    pub fn clear(&mut self, slot: usize) -> Result<Option<Country>, BallotError> {
        if slot >= BALLOT_SLOTS {
            return Err(BallotError::SlotOutOfRange(slot));
        }
        Ok(self.slots[slot].take())
    }

    /// Adds `country` to the first empty slot, moving it there if it is
    /// already placed elsewhere. Returns the slot used.
    pub fn push_first_empty(&mut self, country: Country) -> Result<usize, BallotError> {
        if let Some(old) = self.slot_of(&country) {
            self.slots[old] = None;
        }
        let slot = self.first_empty().ok_or(BallotError::Full)?;
        self.slots[slot] = Some(country);
        Ok(slot)
    }
}

// The wire format is a bare array of exactly BALLOT_SLOTS strings with ""
// standing for an empty slot, so (de)serialization is written by hand
// instead of deriving a struct shape the store would not understand.
impl Serialize for Ballot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(BALLOT_SLOTS))?;
        for slot in &self.slots {
            seq.serialize_element(slot.as_deref().unwrap_or(""))?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Ballot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BallotVisitor;

        impl<'de> Visitor<'de> for BallotVisitor {
            type Value = Ballot;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a sequence of up to 10 country names, \"\" for an empty slot")
            }

            fn visit_seq<V>(self, mut seq: V) -> Result<Self::Value, V::Error>
            where
                V: SeqAccess<'de>,
            {
                let mut slots = Vec::with_capacity(BALLOT_SLOTS);
                while let Some(entry) = seq.next_element::<String>()? {
                    slots.push(Some(entry).filter(|entry| !entry.is_empty()));
                }
                Ballot::from_slots(slots).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_seq(BallotVisitor)
    }
}
