//! Recognition ledger state.
//!
//! A ledger is two tallies: how many high-fives each user has given and how
//! many they have received. Tallies remember the order in which users first
//! appeared, which is what leaderboards use to break ties.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::recognition::UserId;

/// Per-user counts in first-appearance order. Absent users count as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(UserId, u64)>,
    index: HashMap<UserId, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: &UserId) -> u64 {
        self.index.get(user).map(|position| self.entries[*position].1).unwrap_or(0)
    }

    /// Adds one to `user`, appending it if unseen, and returns the new count.
    pub fn increment(&mut self, user: &UserId) -> u64 {
        self.add(user, 1)
    }

    pub fn add(&mut self, user: &UserId, amount: u64) -> u64 {
        match self.index.get(user) {
            Some(position) => {
                let entry = &mut self.entries[*position];
                entry.1 = entry.1.saturating_add(amount);
                entry.1
            }
            None => {
                self.index.insert(user.clone(), self.entries.len());
                self.entries.push((user.clone(), amount));
                amount
            }
        }
    }

    /// Replaces a user's count, keeping its original position when already present.
    pub fn set(&mut self, user: UserId, count: u64) {
        match self.index.get(&user) {
            Some(position) => self.entries[*position].1 = count,
            None => {
                self.index.insert(user.clone(), self.entries.len());
                self.entries.push((user, count));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, u64)> {
        self.entries.iter().map(|(user, count)| (user, *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| *count).sum()
    }
}

impl FromIterator<(UserId, u64)> for Tally {
    fn from_iter<I: IntoIterator<Item = (UserId, u64)>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for (user, count) in iter {
            tally.set(user, count);
        }
        tally
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (user, count) in &self.entries {
            map.serialize_entry(user.as_str(), count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Tally {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TallyVisitor;

        impl<'de> Visitor<'de> for TallyVisitor {
            type Value = Tally;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of user ids to non-negative counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Tally, A::Error> {
                let mut tally = Tally::new();
                while let Some((user, count)) = access.next_entry::<String, u64>()? {
                    tally.set(UserId(user), count);
                }
                Ok(tally)
            }
        }

        deserializer.deserialize_map(TallyVisitor)
    }
}

/// Immutable copy of the whole ledger as returned by a store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub given_counts: Tally,
    #[serde(default)]
    pub received_counts: Tally,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordedCounts {
    pub giver: UserId,
    pub giver_given: u64,
    pub receiver: UserId,
    pub receiver_received: u64,
}

impl LedgerSnapshot {
    pub fn is_empty(&self) -> bool {
        self.given_counts.is_empty() && self.received_counts.is_empty()
    }

    /// Applies one recognition to both tallies.
    pub fn record(&mut self, giver: &UserId, receiver: &UserId) -> RecordedCounts {
        let giver_given = self.given_counts.increment(giver);
        let receiver_received = self.received_counts.increment(receiver);
        RecordedCounts {
            giver: giver.clone(),
            giver_given,
            receiver: receiver.clone(),
            receiver_received,
        }
    }
}
