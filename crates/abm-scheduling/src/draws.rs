//! Where a round's uniform draws come from.

use abm_core::{DrawKey, DrawStream};

/// A source of keyed uniform draws in `[0, 1)`.
///
/// The scheduler asks for one draw per chooser per round, keyed by
/// `(tour id, round, 0)`, so any implementation that is a pure function of
/// the key keeps runs reproducible regardless of visiting order.
pub trait DrawSource: Send + Sync {
    fn uniform(&self, key: DrawKey) -> f64;
}

impl DrawSource for DrawStream {
    fn uniform(&self, key: DrawKey) -> f64 {
        DrawStream::uniform(self, key)
    }
}

/// Wraps a closure as a draw source; tests use it to pin exact draws.
pub struct DrawFn<F>(pub F);

impl<F> DrawSource for DrawFn<F>
where
    F: Fn(DrawKey) -> f64 + Send + Sync,
{
    fn uniform(&self, key: DrawKey) -> f64 {
        (self.0)(key)
    }
}
