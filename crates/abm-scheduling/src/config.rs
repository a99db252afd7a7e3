/// Run-level settings for a [`TourScheduler`][crate::TourScheduler].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerConfig {
    /// Global seed for keyed draws.
    pub seed: u64,
    /// Model-step channel.  Steps sharing a seed but not a channel draw
    /// independently.
    pub channel: u32,
    /// Rescale each chooser's probabilities to sum to 1 before drawing.
    /// Off by default: the choice kernel handles small residuals itself.
    pub renormalize: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { seed: 0, channel: 0, renormalize: false }
    }
}
