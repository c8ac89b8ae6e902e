//! Errors raised while building the timing structures of a chart.

use thiserror::Error;

use crate::track::{Lane, ModifierKind, TrackKey};

/// Which of the two sync track event kinds an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncEventKind {
    /// A tempo (`B`) event.
    Tempo,
    /// A time signature (`TS`) event.
    TimeSignature,
}

impl std::fmt::Display for SyncEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tempo => write!(f, "tempo"),
            Self::TimeSignature => write!(f, "time signature"),
        }
    }
}

/// A structural error found while building one track.
///
/// Every variant carries the raw values involved, so a caller can point at the offending line.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuildError {
    /// No event of `kind` is resolvable at tick 0.
    #[error("no {kind} event at tick 0")]
    MissingInitialEvent {
        /// The kind of the missing event.
        kind: SyncEventKind,
    },
    /// A tick was negative.
    #[error("tick {tick} is out of range")]
    InvalidTick {
        /// The raw tick value.
        tick: i64,
    },
    /// A sustain or phrase reached past the last representable tick.
    #[error("span of {span} ticks from tick {tick} is out of range")]
    TickOverflow {
        /// Where the span starts.
        tick: u64,
        /// The length of the span in ticks.
        span: u64,
    },
    /// The same lane was declared twice at one tick.
    #[error("lane {lane:?} declared twice at tick {tick}")]
    DuplicateLane {
        /// The tick of the chord.
        tick: u64,
        /// The duplicated lane.
        lane: Lane,
    },
    /// Two star power phrases intersect.
    #[error(
        "star power phrase at tick {} (length {}) overlaps phrase at tick {} (length {})",
        .first.0, .first.1, .second.0, .second.1
    )]
    OverlappingPhrase {
        /// `(tick, duration)` of the earlier phrase.
        first: (u64, u64),
        /// `(tick, duration)` of the later phrase.
        second: (u64, u64),
    },
    /// A tempo event declared a non-positive (or non-finite) BPM.
    #[error("tempo at tick {tick} must be positive, but got {bpm}")]
    NonPositiveTempo {
        /// The tick of the tempo event.
        tick: u64,
        /// The raw BPM value.
        bpm: f64,
    },
    /// The resolution was zero.
    #[error("resolution must be positive, but got {resolution}")]
    InvalidResolution {
        /// The raw resolution value.
        resolution: u32,
    },
    /// A time signature had a zero numerator or a denominator which is not a power of two.
    #[error("invalid time signature {numerator}/{denominator} at tick {tick}")]
    InvalidTimeSignature {
        /// The tick of the time signature event.
        tick: u64,
        /// The raw numerator.
        numerator: u32,
        /// The raw denominator.
        denominator: u32,
    },
    /// A chord modifier was declared at a tick without any note.
    #[error("{kind:?} modifier at tick {tick} has no note to apply to")]
    OrphanModifier {
        /// The tick of the modifier.
        tick: u64,
        /// The modifier kind.
        kind: ModifierKind,
    },
    /// The first chord of a track was forced, which has no previous note to hammer on from.
    #[error("the first note of a track cannot be forced, but it is at tick {tick}")]
    ForcedFirstNote {
        /// The tick of the first chord.
        tick: u64,
    },
    /// A query interval contained no time.
    #[error("interval from {start} to {end} seconds is empty")]
    EmptyInterval {
        /// Start of the interval in seconds.
        start: f64,
        /// End of the interval in seconds.
        end: f64,
    },
}

/// Type alias of `core::result::Result<T, BuildError>`.
pub type Result<T> = core::result::Result<T, BuildError>;

/// A [`BuildError`] tagged with the track it came from.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartError {
    /// The sync track could not be built.
    #[error("sync track: {0}")]
    SyncTrack(#[source] BuildError),
    /// An instrument track could not be built.
    #[error("track {track}: {source}")]
    EventTrack {
        /// The instrument and difficulty of the failing track.
        track: TrackKey,
        /// What went wrong.
        #[source]
        source: BuildError,
    },
    /// The global events track could not be built.
    #[error("global events: {0}")]
    GlobalEvents(#[source] BuildError),
}

impl ChartError {
    /// The underlying structural error.
    #[must_use]
    pub const fn build_error(&self) -> &BuildError {
        match self {
            Self::SyncTrack(source)
            | Self::EventTrack { source, .. }
            | Self::GlobalEvents(source) => source,
        }
    }
}
