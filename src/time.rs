//! Real-time quantities: elapsed seconds and tempo.
//!
//! Both are thin wrappers over `f64` that reject values outside their domain on construction, so
//! everything past the constructors can compare and order them without thinking about NaN.

use std::{
    fmt,
    ops::{Add, Sub},
};

use thiserror::Error;

/// A float rejected by [`Seconds`] or [`Bpm`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{value} is not a valid {quantity}")]
pub struct OutOfDomain {
    /// Name of the quantity, `seconds` or `BPM`.
    pub quantity: &'static str,
    /// The rejected value.
    pub value: f64,
}

/// A finite, non-negative number of seconds.
///
/// Used both for timestamps (seconds elapsed since tick 0) and for durations such as sustain
/// lengths. Arithmetic saturates at [`Seconds::MAX`] instead of overflowing to infinity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "f64", into = "f64")
)]
#[repr(transparent)]
pub struct Seconds(f64);

impl Eq for Seconds {}
impl PartialOrd for Seconds {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Seconds {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Seconds {
    /// Zero seconds, the timestamp of tick 0.
    pub const ZERO: Self = Self(0.0);

    /// The largest representable duration.
    pub const MAX: Self = Self(f64::MAX);

    /// Creates a new `Seconds` if `secs` is finite and non-negative, otherwise returns `None`.
    ///
    /// `-0.0` is normalized to `0.0`.
    #[inline]
    #[must_use]
    pub fn new(secs: f64) -> Option<Self> {
        (secs.is_finite() && secs >= 0.0).then_some(Self(secs + 0.0))
    }

    /// Creates a new `Seconds`, clamping into `[0, MAX]`. NaN becomes zero.
    #[must_use]
    pub fn saturating(secs: f64) -> Self {
        if secs.is_nan() {
            return Self::ZERO;
        }
        Self(secs.clamp(0.0, f64::MAX) + 0.0)
    }

    /// Gets the internal value.
    #[inline]
    #[must_use]
    pub const fn as_f64(self) -> f64 {
        self.0
    }

    /// Subtracts `other`, clamping at zero.
    ///
    /// Timestamps are non-decreasing in tick, so the clamp only absorbs rounding noise.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self((self.0 - other.0).max(0.0))
    }
}

impl TryFrom<f64> for Seconds {
    type Error = OutOfDomain;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(OutOfDomain {
            quantity: "seconds",
            value,
        })
    }
}

impl From<Seconds> for f64 {
    fn from(value: Seconds) -> Self {
        value.as_f64()
    }
}

impl Add for Seconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self((self.0 + rhs.0).min(f64::MAX))
    }
}

impl Sub for Seconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.0)
    }
}

/// A tempo in beats (quarter notes) per minute. Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "f64", into = "f64")
)]
#[repr(transparent)]
pub struct Bpm(f64);

impl Eq for Bpm {}
impl PartialOrd for Bpm {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Bpm {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Bpm {
    /// 120 BPM, the tempo implied by [`crate::config::InitialEventPolicy::implied_default`].
    pub const DEFAULT: Self = Self(120.0);

    /// Creates a new `Bpm` if `bpm` is finite and positive, otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn new(bpm: f64) -> Option<Self> {
        (bpm.is_finite() && bpm > 0.0).then_some(Self(bpm))
    }

    /// Decodes the `.chart` representation, which stores the tempo multiplied by 1000.
    #[must_use]
    pub fn from_millibeats(millibeats: u64) -> Option<Self> {
        Self::new(millibeats as f64 / 1000.0)
    }

    /// Gets the internal value.
    #[inline]
    #[must_use]
    pub const fn as_f64(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Bpm {
    type Error = OutOfDomain;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(OutOfDomain {
            quantity: "BPM",
            value,
        })
    }
}

impl From<Bpm> for f64 {
    fn from(value: Bpm) -> Self {
        value.as_f64()
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}
