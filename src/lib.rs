//! keyrhythm - keystroke-rhythm typing profiles.
//!
//! This library captures the timing between consecutive key presses, turns
//! it into a typing profile, and scores profiles against each other.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          keyrhythm                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Collector  │──▶│   Profile   │──▶│   Compare   │       │
//! │  │ (raw tty)   │   │  (digraphs) │   │ (mean sq.)  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                           │                 ▲               │
//! │                           ▼                 │               │
//! │                    ┌─────────────────────────────┐          │
//! │                    │   Store (profile_*.txt)     │          │
//! │                    └─────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use keyrhythm::{collector, core, store::ProfileStore};
//!
//! let mut out = std::io::stdout();
//! let events = collector::capture_from_terminal(&mut out, collector::ESCAPE)
//!     .expect("Failed to capture keys");
//! let profile = core::build_profile(&events, core::DEFAULT_TIMEOUT);
//!
//! let store = ProfileStore::new(".");
//! for stored in store.load_all().expect("Failed to list profiles").profiles {
//!     println!("{} {:?}", stored.name, core::compare_profiles(&stored.profile, &profile));
//! }
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod store;

// Re-export key types at crate root for convenience
pub use collector::{CollectorError, KeystrokeEvent};
pub use config::{Config, ConfigError};
pub use core::{build_profile, compare_profiles, CompareError, KeyPair, Profile};
pub use store::{ProfileStore, StoreError, StoredProfile};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
