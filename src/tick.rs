//! Tick definition for `.chart` files. A tick only represents a position on the score, so you
//! need to know the tempo map up to it for finding the seconds at which an event happens.

use std::{fmt, num::NonZeroU32};

use crate::{
    error::{BuildError, Result},
    time::{Bpm, Seconds},
};

/// A position on the chart's musical timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    /// The start of the chart.
    pub const ZERO: Self = Self(0);

    /// Returns the tick `ticks` after this one.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TickOverflow`] if the result does not fit into a tick.
    pub fn checked_add(self, ticks: u64) -> Result<Self> {
        self.0
            .checked_add(ticks)
            .map(Self)
            .ok_or(BuildError::TickOverflow {
                tick: self.0,
                span: ticks,
            })
    }

    /// Number of ticks from `self` up to `later`, or zero if `later` is not after `self`.
    #[must_use]
    pub const fn ticks_until(self, later: Self) -> u64 {
        later.0.saturating_sub(self.0)
    }
}

impl TryFrom<i64> for Tick {
    type Error = BuildError;

    fn try_from(tick: i64) -> Result<Self> {
        u64::try_from(tick)
            .map(Self)
            .map_err(|_| BuildError::InvalidTick { tick })
    }
}

impl From<Tick> for u64 {
    fn from(value: Tick) -> Self {
        value.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t@{:07}", self.0)
    }
}

/// Number of ticks in a quarter note. Constant for a whole chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution(NonZeroU32);

impl Resolution {
    /// The resolution used by almost every chart in the wild.
    pub const STANDARD: Self = Self(NonZeroU32::MIN.saturating_add(191));

    /// Creates a resolution of `ticks` per quarter note.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidResolution`] if `ticks` is zero.
    pub fn new(ticks: u32) -> Result<Self> {
        NonZeroU32::new(ticks)
            .map(Self)
            .ok_or(BuildError::InvalidResolution { resolution: ticks })
    }

    /// Gets the number of ticks per quarter note.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Ticks between two notes of an eighth-note triplet, rounded to the nearest tick.
    ///
    /// Two single notes at most this far apart form a natural hammer-on/pull-off.
    #[must_use]
    pub const fn eighth_triplet(self) -> u64 {
        let ticks = self.0.get() as u64;
        (ticks + 1) / 3
    }

    /// Converts a tick delta into quarter-note beats.
    #[must_use]
    pub fn beats(self, ticks: u64) -> f64 {
        ticks as f64 / f64::from(self.get())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks/beat", self.0)
    }
}

/// Seconds that elapse from `from` to `to` at a constant tempo of `bpm`.
///
/// Evaluated as `((to - from) / resolution) * 60 / bpm`, in that order: a delta of whole beats
/// divides exactly, so beat-aligned positions carry a single rounding step. A span too long to
/// represent saturates at [`Seconds::MAX`].
#[must_use]
pub fn seconds_between(resolution: Resolution, from: Tick, to: Tick, bpm: Bpm) -> Seconds {
    let beats = resolution.beats(from.ticks_until(to));
    Seconds::saturating(beats * 60.0 / bpm.as_f64())
}
