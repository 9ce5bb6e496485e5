//! # Warband Core
//!
//! Domain types, season tables and the Great Vault projection engine for
//! the Warband roster tracker. This crate has **no I/O** beyond the
//! [`RosterStore`] trait; storage backends, the HTTP gateway and the CLI
//! all depend inward on it.
//!
//! ## Layout
//!
//! - [`tables`] and [`season`]: fixed per-season data
//! - [`progress`]: the weekly activity record
//! - [`vault`]: pure projection from a record to nine reward slots
//! - [`grid`]: the 3×3 display form of a projection
//! - [`character`] and [`roster`]: the tracked document and its operations

pub mod error;
pub mod season;
pub mod tables;
pub mod progress;
pub mod vault;
pub mod grid;
pub mod character;
pub mod roster;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, RosterError, StoreError};
pub use season::{SeasonWeek, MAX_SEASON_WEEK};
pub use tables::Difficulty;
pub use progress::{DungeonRun, WeeklyProgressRecord, WeeklyProgressUpdate};
pub use vault::{project, RewardSlot, RewardSlotProjection, Track};
pub use grid::{GridCell, VaultGrid};
pub use character::{Character, CrestKind};
pub use roster::{Roster, RosterMeta, TaskKind};
pub use store::RosterStore;
