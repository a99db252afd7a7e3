//! `abm-scheduling`: the iterative tour scheduler.
//!
//! Tours are grouped by scheduling unit (a person, or a parent tour for
//! at-work subtours) and visited in rounds: round `k` holds the `k`-th tour
//! of every unit, ordered by `(unit, tour_num, tour id)`.  Each round
//!
//! 1. filters the alternative table down to spans that fit the unit's
//!    window (and, for subtours, the parent's committed span),
//! 2. asks a [`ProbabilityProvider`] for probabilities over those spans,
//! 3. draws one alternative per tour with [`abm_choice::make_choices`],
//! 4. commits the choices into the timetable before the next round.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`tours`]     | `Tour`, `Chooser`, `Assignment`, previous-tour lookup   |
//! | [`provider`]  | `ProbabilityProvider`, `LogitProvider`                  |
//! | [`context`]   | `RoundContext`, `Step`                                  |
//! | [`draws`]     | `DrawSource`, `DrawFn`: keyed uniforms per chooser      |
//! | [`config`]    | `SchedulerConfig`                                       |
//! | [`builder`]   | `SchedulerBuilder`                                      |
//! | [`observer`]  | `SchedulingObserver`, `NoopObserver`, `RoundStats`      |
//! | [`scheduler`] | `TourScheduler`                                         |
//! | [`error`]     | `SchedulingError`, `SchedulingResult<T>`                |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Rayon candidate filtering and choice kernels            |
//! | `serde`    | `Serialize`/`Deserialize` on public data types          |

pub mod builder;
pub mod config;
pub mod context;
pub mod draws;
pub mod error;
pub mod observer;
pub mod provider;
pub mod scheduler;
pub mod tours;


pub use builder::SchedulerBuilder;
pub use config::SchedulerConfig;
pub use context::{RoundContext, Step};
pub use draws::{DrawFn, DrawSource};
pub use error::{SchedulingError, SchedulingResult};
pub use observer::{NoopObserver, RoundStats, RoundSummary, SchedulingObserver};
pub use provider::{LogitProvider, ProbabilityProvider};
pub use scheduler::TourScheduler;
pub use tours::{Assignment, Chooser, Tour, previous_tour_attributes};
