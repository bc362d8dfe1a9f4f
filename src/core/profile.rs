//! Typing profiles built from keystroke sequences.
//!
//! A profile maps each observed digraph (previous key, current key) to the
//! mean latency between the two presses. Only consecutive presses closer
//! together than the timeout count; longer gaps are pauses, not rhythm.

use crate::collector::types::KeystrokeEvent;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default maximum latency for a transition to count.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// An ordered digraph transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPair {
    pub prev: u32,
    pub cur: u32,
}

impl KeyPair {
    pub fn new(prev: u32, cur: u32) -> Self {
        Self { prev, cur }
    }
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.prev, self.cur)
    }
}

/// Error parsing a `"<prev>,<cur>"` key pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid key pair '{0}', expected '<prev>,<cur>'")]
pub struct ParseKeyPairError(pub String);

impl FromStr for KeyPair {
    type Err = ParseKeyPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseKeyPairError(s.to_string());
        let (prev, cur) = s.split_once(',').ok_or_else(err)?;
        let prev = prev.trim().parse().map_err(|_| err())?;
        let cur = cur.trim().parse().map_err(|_| err())?;
        Ok(Self { prev, cur })
    }
}

/// Mean inter-key latency (seconds) per observed key pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    latencies: BTreeMap<KeyPair, f64>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the latency for a pair, replacing any previous value.
    pub fn insert(&mut self, pair: KeyPair, latency: f64) -> Option<f64> {
        self.latencies.insert(pair, latency)
    }

    pub fn get(&self, pair: &KeyPair) -> Option<f64> {
        self.latencies.get(pair).copied()
    }

    pub fn contains(&self, pair: &KeyPair) -> bool {
        self.latencies.contains_key(pair)
    }

    pub fn len(&self) -> usize {
        self.latencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latencies.is_empty()
    }

    /// Pairs and latencies in key-pair order.
    pub fn pairs(&self) -> impl Iterator<Item = (KeyPair, f64)> + '_ {
        self.latencies.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(KeyPair, f64)> for Profile {
    fn from_iter<I: IntoIterator<Item = (KeyPair, f64)>>(iter: I) -> Self {
        Self {
            latencies: iter.into_iter().collect(),
        }
    }
}

/// Build a profile from captured events.
///
/// Each consecutive pair of events contributes its elapsed time to the
/// `(a.key, b.key)` bucket when `0 <= elapsed < timeout`. Every bucket is then
/// reduced to its arithmetic mean. Pairs never seen under the timeout are
/// absent rather than zero.
pub fn build_profile(events: &[KeystrokeEvent], timeout: Duration) -> Profile {
    let limit = timeout.as_secs_f64();
    let mut buckets: BTreeMap<KeyPair, Vec<f64>> = BTreeMap::new();
    let mut skipped = 0usize;

    for pair in events.windows(2) {
        let elapsed = pair[1].timestamp - pair[0].timestamp;
        if (0.0..limit).contains(&elapsed) {
            buckets
                .entry(KeyPair::new(pair[0].key, pair[1].key))
                .or_default()
                .push(elapsed);
        } else {
            skipped += 1;
        }
    }

    tracing::debug!(
        events = events.len(),
        pairs = buckets.len(),
        skipped,
        "built profile"
    );

    buckets
        .into_iter()
        .map(|(pair, samples)| {
            let mean = samples.iter().sum::<f64>() / samples.len() as f64;
            (pair, mean)
        })
        .collect()
}
