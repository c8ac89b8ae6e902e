//! Knobs for building a chart.
//!
//! A [`ChartConfig`] is passed by reference into every constructor that has a policy decision to
//! make. The default is strict: nothing missing from the input is invented.

use crate::{sync::TimeSignature, time::Bpm};

/// What to do when the sync track declares no tempo or no time signature at tick 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InitialEventPolicy {
    /// Choose to fail with [`crate::error::BuildError::MissingInitialEvent`].
    #[default]
    Require,
    /// Choose to insert the given events at tick 0 where the input has none.
    Imply {
        /// Tempo inserted when no tempo event is at tick 0.
        bpm: Bpm,
        /// Time signature inserted when no time signature event is at tick 0.
        time_signature: TimeSignature,
    },
}

impl InitialEventPolicy {
    /// Implies 120 BPM and 4/4, the values charting tools write into new charts.
    #[must_use]
    pub const fn implied_default() -> Self {
        Self::Imply {
            bpm: Bpm::DEFAULT,
            time_signature: TimeSignature::COMMON,
        }
    }
}

/// Configuration for building a [`crate::chart::Chart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartConfig {
    /// Policy for missing tick-0 sync events.
    pub initial_events: InitialEventPolicy,
    /// Whether to build event tracks in parallel. Only honored with the `rayon` feature.
    pub parallel: bool,
}

impl ChartConfig {
    /// Creates the strict default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_events: InitialEventPolicy::Require,
            parallel: false,
        }
    }

    /// Sets the policy for missing tick-0 sync events.
    #[must_use]
    pub const fn initial_events(mut self, policy: InitialEventPolicy) -> Self {
        self.initial_events = policy;
        self
    }

    /// Sets whether event tracks are built in parallel.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
