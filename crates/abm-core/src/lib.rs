//! `abm-core`: foundational types for the `abm` tour-scheduling framework.
//!
//! This crate is a dependency of every other `abm-*` crate.  It intentionally
//! has no `abm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `PersonId`, `TourId`, `TddAltId`, `PurposeId`         |
//! | [`period`]      | `Period`, `DayConfig`                                 |
//! | [`rng`]         | `DrawKey`, `DrawStream`                               |
//! | [`error`]       | `AbmError`, `AbmResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod period;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{AbmError, AbmResult};
pub use ids::{PersonId, PurposeId, TddAltId, TourId};
pub use period::{DayConfig, Period};
pub use rng::{DrawKey, DrawStream};
