//! Core functionality for keyrhythm.
//!
//! This module contains:
//! - Profile building from captured keystroke events
//! - Distance scoring between profiles

pub mod compare;
pub mod profile;

// Re-export commonly used types
pub use compare::{best_match, compare_profiles, rank_profiles, CompareError, Match};
pub use profile::{build_profile, KeyPair, ParseKeyPairError, Profile, DEFAULT_TIMEOUT};
