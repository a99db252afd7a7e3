//! `abm-timetable`: time-of-day alternatives and per-unit time windows.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`tdd`]       | `TddAlt`, `TddAlts`: the shared start/end/duration table   |
//! | [`timetable`] | `Timetable<U>`, `Window`, `PeriodFlags`, `WindowKey`       |
//! | [`loader`]    | `load_tdd_alts_csv`, `load_tdd_alts_reader`                |
//! | [`persist`]   | window CSV write / read for carrying state between steps   |
//! | [`tour_map`]  | text rendering of windows for tracing                      |
//! | [`error`]     | `TimetableError`, `TimetableResult<T>`                     |
//!
//! # Boundary convention (summary)
//!
//! A tour occupies the closed period range `[start, end]`.  Two tours fit
//! in the same window iff one ends no later than the other starts:
//!
//! ```text
//! a.end <= b.start  ||  b.end <= a.start
//! ```
//!
//! so consecutive tours may share exactly one boundary period, and a
//! zero-duration tour may sit on either boundary of a longer one.

pub mod error;
pub mod loader;
pub mod persist;
pub mod tdd;
pub mod timetable;
pub mod tour_map;

#[cfg(test)]
mod tests;

pub use error::{TimetableError, TimetableResult};
pub use loader::{load_tdd_alts_csv, load_tdd_alts_reader};
pub use persist::{read_windows_csv, read_windows, write_windows_csv, write_windows};
pub use tdd::{TddAlt, TddAlts};
pub use timetable::{CommitOutcome, CommittedTour, PeriodFlags, Timetable, Window, WindowKey};
pub use tour_map::{render_window, tour_map};
