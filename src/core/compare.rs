//! Profile comparison.
//!
//! The distance between two profiles is the mean squared latency difference
//! over the key pairs both of them contain. Lower means a closer rhythm.

use crate::core::profile::Profile;
use thiserror::Error;

/// Errors from comparing profiles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    /// The two profiles have no key pair in common.
    #[error("incomparable (no shared key pairs)")]
    NoSharedPairs,
}

/// Mean squared difference over the shared key pairs.
pub fn compare_profiles(lhs: &Profile, rhs: &Profile) -> Result<f64, CompareError> {
    let mut shared = 0usize;
    let mut total = 0.0;

    for (pair, left) in lhs.pairs() {
        if let Some(right) = rhs.get(&pair) {
            let diff = left - right;
            total += diff * diff;
            shared += 1;
        }
    }

    if shared == 0 {
        return Err(CompareError::NoSharedPairs);
    }
    Ok(total / shared as f64)
}

/// One stored profile scored against a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub name: String,
    pub score: Result<f64, CompareError>,
}

/// Score `candidate` against every stored profile.
///
/// Results are ordered by ascending score; incomparable profiles go last,
/// and ties keep their input order.
pub fn rank_profiles<'a, I>(candidate: &Profile, stored: I) -> Vec<Match>
where
    I: IntoIterator<Item = (&'a str, &'a Profile)>,
{
    let mut matches: Vec<Match> = stored
        .into_iter()
        .map(|(name, profile)| Match {
            name: name.to_string(),
            score: compare_profiles(profile, candidate),
        })
        .collect();

    matches.sort_by(|a, b| match (&a.score, &b.score) {
        (Ok(x), Ok(y)) => x.total_cmp(y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => std::cmp::Ordering::Equal,
    });
    matches
}

/// The closest comparable match, if any.
pub fn best_match(matches: &[Match]) -> Option<&Match> {
    matches
        .iter()
        .filter(|m| m.score.is_ok())
        .min_by(|a, b| {
            let x = a.score.as_ref().copied().unwrap_or(f64::INFINITY);
            let y = b.score.as_ref().copied().unwrap_or(f64::INFINITY);
            x.total_cmp(&y)
        })
}
