//! The tempo map of a chart and the conversion from ticks into seconds.
//!
//! # Coincident events
//!
//! When several tempo (or time signature) events are declared on the same tick, only the last
//! declared one is kept.
//!
//! # Precision
//!
//! The timestamp of every tempo event is computed once on construction, each segment from its own
//! anchor. A query then adds a single segment to the nearest preceding anchor, so the query path
//! reproduces the anchors bit for bit and error never accumulates across many small steps.

use crate::{
    config::{ChartConfig, InitialEventPolicy},
    error::{BuildError, Result, SyncEventKind},
    tick::{Resolution, Tick, seconds_between},
    time::{Bpm, Seconds},
};

/// A time signature, `numerator` beats of `1/denominator` notes per measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawTimeSignatureValue")
)]
pub struct TimeSignature {
    /// Beats per measure.
    pub numerator: u32,
    /// Note value of one beat. Always a power of two.
    pub denominator: u32,
}

impl TimeSignature {
    /// 4/4.
    pub const COMMON: Self = Self {
        numerator: 4,
        denominator: 4,
    };

    /// Creates a time signature, or `None` if `numerator` is zero or `denominator` is not a
    /// power of two.
    #[must_use]
    pub const fn new(numerator: u32, denominator: u32) -> Option<Self> {
        if numerator == 0 || !denominator.is_power_of_two() {
            return None;
        }
        Some(Self {
            numerator,
            denominator,
        })
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTimeSignatureValue {
    numerator: u32,
    denominator: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTimeSignatureValue> for TimeSignature {
    type Error = &'static str;

    fn try_from(value: RawTimeSignatureValue) -> core::result::Result<Self, Self::Error> {
        Self::new(value.numerator, value.denominator)
            .ok_or("time signature needs a positive numerator and a power of two denominator")
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A tempo change as declared in the input, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTempo {
    /// Where the tempo changes.
    pub tick: i64,
    /// The new tempo.
    pub bpm: f64,
}

/// A time signature change as declared in the input, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTimeSignature {
    /// Where the time signature changes.
    pub tick: i64,
    /// Beats per measure.
    pub numerator: u32,
    /// Note value of one beat.
    pub denominator: u32,
}

/// A tempo change, annotated with the timestamp at which it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoEvent {
    /// Where the tempo changes.
    pub tick: Tick,
    /// Seconds elapsed from tick 0 until this change.
    pub timestamp: Seconds,
    /// The tempo from this tick on.
    pub bpm: Bpm,
}

/// A time signature change, annotated with the timestamp at which it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSignatureEvent {
    /// Where the time signature changes.
    pub tick: Tick,
    /// Seconds elapsed from tick 0 until this change.
    pub timestamp: Seconds,
    /// The time signature from this tick on.
    pub time_signature: TimeSignature,
}

/// The tempo and meter timeline of a chart.
///
/// Both event sequences are sorted strictly ascending by tick and begin at tick 0. It is the only
/// place where ticks are turned into seconds.
///
/// With the `serde` feature, it is represented by its declared events and rebuilt through
/// [`SyncTrack::new`] with the strict [`ChartConfig`] on deserialization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "SyncTrackEvents", into = "SyncTrackEvents")
)]
pub struct SyncTrack {
    resolution: Resolution,
    tempos: Vec<TempoEvent>,
    time_signatures: Vec<TimeSignatureEvent>,
}

impl SyncTrack {
    /// Builds a sync track from raw, possibly unsorted, possibly duplicated events.
    ///
    /// # Errors
    ///
    /// - [`BuildError::InvalidTick`] if any tick is negative.
    /// - [`BuildError::NonPositiveTempo`] if any declared tempo is not positive.
    /// - [`BuildError::InvalidTimeSignature`] if any declared time signature is malformed.
    /// - [`BuildError::MissingInitialEvent`] if either sequence has nothing at tick 0 and
    ///   `config` requires one.
    pub fn new(
        resolution: Resolution,
        tempos: impl IntoIterator<Item = RawTempo>,
        time_signatures: impl IntoIterator<Item = RawTimeSignature>,
        config: &ChartConfig,
    ) -> Result<Self> {
        let tempos = tempos
            .into_iter()
            .map(|RawTempo { tick, bpm }| {
                let tick = Tick::try_from(tick)?;
                let bpm = Bpm::new(bpm).ok_or(BuildError::NonPositiveTempo { tick: tick.0, bpm })?;
                Ok((tick, bpm))
            })
            .collect::<Result<Vec<_>>>()?;
        let time_signatures = time_signatures
            .into_iter()
            .map(
                |RawTimeSignature {
                     tick,
                     numerator,
                     denominator,
                 }| {
                    let tick = Tick::try_from(tick)?;
                    let time_signature = TimeSignature::new(numerator, denominator).ok_or(
                        BuildError::InvalidTimeSignature {
                            tick: tick.0,
                            numerator,
                            denominator,
                        },
                    )?;
                    Ok((tick, time_signature))
                },
            )
            .collect::<Result<Vec<_>>>()?;

        let mut tempos = keep_last_per_tick(tempos, SyncEventKind::Tempo);
        let mut time_signatures =
            keep_last_per_tick(time_signatures, SyncEventKind::TimeSignature);

        if tempos.first().is_none_or(|&(tick, _)| tick != Tick::ZERO) {
            let InitialEventPolicy::Imply { bpm, .. } = config.initial_events else {
                return Err(BuildError::MissingInitialEvent {
                    kind: SyncEventKind::Tempo,
                });
            };
            log::debug!("no tempo at tick 0, implying {bpm}");
            tempos.insert(0, (Tick::ZERO, bpm));
        }
        if time_signatures
            .first()
            .is_none_or(|&(tick, _)| tick != Tick::ZERO)
        {
            let InitialEventPolicy::Imply { time_signature, .. } = config.initial_events else {
                return Err(BuildError::MissingInitialEvent {
                    kind: SyncEventKind::TimeSignature,
                });
            };
            log::debug!("no time signature at tick 0, implying {time_signature}");
            time_signatures.insert(0, (Tick::ZERO, time_signature));
        }

        let mut anchored: Vec<TempoEvent> = Vec::with_capacity(tempos.len());
        for (tick, bpm) in tempos {
            let timestamp = anchored.last().map_or(Seconds::ZERO, |prev| {
                prev.timestamp + seconds_between(resolution, prev.tick, tick, prev.bpm)
            });
            anchored.push(TempoEvent {
                tick,
                timestamp,
                bpm,
            });
        }

        let mut track = Self {
            resolution,
            tempos: anchored,
            time_signatures: Vec::with_capacity(time_signatures.len()),
        };
        track.time_signatures = time_signatures
            .into_iter()
            .map(|(tick, time_signature)| TimeSignatureEvent {
                tick,
                timestamp: track.timestamp_at_tick(tick),
                time_signature,
            })
            .collect();
        Ok(track)
    }

    /// The number of ticks in a quarter note.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Tempo events in ascending tick order. The first one is at tick 0.
    #[must_use]
    pub fn tempo_events(&self) -> &[TempoEvent] {
        &self.tempos
    }

    /// Time signature events in ascending tick order. The first one is at tick 0.
    #[must_use]
    pub fn time_signature_events(&self) -> &[TimeSignatureEvent] {
        &self.time_signatures
    }

    fn tempo_event_at(&self, tick: Tick) -> Option<&TempoEvent> {
        let index = self.tempos.partition_point(|event| event.tick <= tick);
        self.tempos.get(index.checked_sub(1)?)
    }

    /// Returns the timestamp at `tick`.
    ///
    /// This is a binary search over the tempo events plus one segment of arithmetic.
    #[must_use]
    pub fn timestamp_at_tick(&self, tick: Tick) -> Seconds {
        self.tempo_event_at(tick).map_or(Seconds::ZERO, |anchor| {
            anchor.timestamp + seconds_between(self.resolution, anchor.tick, tick, anchor.bpm)
        })
    }

    /// Returns the timestamp at a raw tick.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidTick`] if `tick` is negative.
    pub fn timestamp_at(&self, tick: i64) -> Result<Seconds> {
        Ok(self.timestamp_at_tick(Tick::try_from(tick)?))
    }

    /// Returns how long `ticks` ticks starting from `tick` last.
    ///
    /// The span may straddle any number of tempo changes.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TickOverflow`] if `tick + ticks` overflows.
    pub fn duration_between(&self, tick: Tick, ticks: u64) -> Result<Seconds> {
        let end = tick.checked_add(ticks)?;
        Ok(self.timestamp_at_tick(end) - self.timestamp_at_tick(tick))
    }

    /// Returns the tempo in effect at `tick`.
    #[must_use]
    pub fn bpm_at(&self, tick: Tick) -> Bpm {
        self.tempo_event_at(tick)
            .map_or(Bpm::DEFAULT, |event| event.bpm)
    }

    /// Returns the time signature in effect at `tick`.
    #[must_use]
    pub fn time_signature_at(&self, tick: Tick) -> TimeSignature {
        let index = self
            .time_signatures
            .partition_point(|event| event.tick <= tick);
        index
            .checked_sub(1)
            .and_then(|index| self.time_signatures.get(index))
            .map_or(TimeSignature::COMMON, |event| event.time_signature)
    }

    /// Returns the fractional tick position at `timestamp`, inverting
    /// [`Self::timestamp_at_tick`].
    #[must_use]
    pub fn tick_position_at(&self, timestamp: Seconds) -> f64 {
        let index = self
            .tempos
            .partition_point(|event| event.timestamp <= timestamp);
        let Some(anchor) = index.checked_sub(1).and_then(|index| self.tempos.get(index)) else {
            return 0.0;
        };
        let seconds = (timestamp - anchor.timestamp).as_f64();
        let beats = seconds * anchor.bpm.as_f64() / 60.0;
        anchor.tick.0 as f64 + beats * f64::from(self.resolution.get())
    }

    /// Returns the tick nearest to `timestamp`.
    ///
    /// Exact at every tempo event.
    #[must_use]
    pub fn tick_at_timestamp(&self, timestamp: Seconds) -> Tick {
        Tick(self.tick_position_at(timestamp).round() as u64)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct SyncTrackEvents {
    resolution: u32,
    tempos: Vec<RawTempo>,
    time_signatures: Vec<RawTimeSignature>,
}

#[cfg(feature = "serde")]
impl From<SyncTrack> for SyncTrackEvents {
    fn from(track: SyncTrack) -> Self {
        // Every tick of a built track came from an `i64`.
        let raw_tick = |tick: Tick| i64::try_from(tick.0).unwrap_or(i64::MAX);
        Self {
            resolution: track.resolution.get(),
            tempos: track
                .tempos
                .iter()
                .map(|event| RawTempo {
                    tick: raw_tick(event.tick),
                    bpm: event.bpm.as_f64(),
                })
                .collect(),
            time_signatures: track
                .time_signatures
                .iter()
                .map(|event| RawTimeSignature {
                    tick: raw_tick(event.tick),
                    numerator: event.time_signature.numerator,
                    denominator: event.time_signature.denominator,
                })
                .collect(),
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<SyncTrackEvents> for SyncTrack {
    type Error = BuildError;

    fn try_from(events: SyncTrackEvents) -> Result<Self> {
        Self::new(
            Resolution::new(events.resolution)?,
            events.tempos,
            events.time_signatures,
            &ChartConfig::default(),
        )
    }
}

/// Sorts by tick and keeps only the last declared value on each tick.
fn keep_last_per_tick<T: Copy>(mut events: Vec<(Tick, T)>, kind: SyncEventKind) -> Vec<(Tick, T)> {
    events.sort_by_key(|&(tick, _)| tick);
    let mut kept: Vec<(Tick, T)> = Vec::with_capacity(events.len());
    for (tick, value) in events {
        match kept.last_mut() {
            Some(last) if last.0 == tick => {
                log::debug!("{kind} at {tick} overridden by a later declaration");
                last.1 = value;
            }
            _ => kept.push((tick, value)),
        }
    }
    kept
}
