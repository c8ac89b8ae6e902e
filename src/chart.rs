//! The assembled chart: one sync track shared by every instrument track, plus the global events.
//!
//! A [`Chart`] is built in one go. If any part fails to build, no chart is returned and the
//! [`ChartError`] names the part which failed.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    config::ChartConfig,
    error::{BuildError, ChartError},
    global::{GlobalEventLine, GlobalEventTrack},
    sync::{RawTempo, RawTimeSignature, SyncTrack},
    tick::{Resolution, Tick},
    time::Seconds,
    track::{EventTrack, TrackKey, TrackLine},
};

/// Every raw section of a chart, as handed over by a text splitter.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawChart {
    /// Ticks per quarter note.
    pub resolution: u32,
    /// Tempo changes in declaration order.
    pub tempos: Vec<RawTempo>,
    /// Time signature changes in declaration order.
    pub time_signatures: Vec<RawTimeSignature>,
    /// Lines of every instrument track, each in declaration order.
    pub tracks: BTreeMap<TrackKey, Vec<TrackLine>>,
    /// Lines of the `[Events]` section in declaration order.
    pub global_events: Vec<GlobalEventLine>,
}

/// A fully resolved chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    sync_track: Arc<SyncTrack>,
    tracks: BTreeMap<TrackKey, EventTrack>,
    global_events: GlobalEventTrack,
}

impl Chart {
    /// Builds the sync track from `raw`, then assembles everything else on top of it.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::SyncTrack`] if the resolution or the sync track is invalid, and
    /// otherwise whatever [`Self::assemble`] returns.
    pub fn from_raw(raw: RawChart, config: &ChartConfig) -> Result<Self, ChartError> {
        let RawChart {
            resolution,
            tempos,
            time_signatures,
            tracks,
            global_events,
        } = raw;
        let resolution = Resolution::new(resolution).map_err(ChartError::SyncTrack)?;
        let sync_track = SyncTrack::new(resolution, tempos, time_signatures, config)
            .map_err(ChartError::SyncTrack)?;
        Self::assemble(sync_track, tracks, global_events, config)
    }

    /// Builds every instrument track and the global events against `sync_track`.
    ///
    /// With the `rayon` feature and [`ChartConfig::parallel`] set, instrument tracks are built
    /// in parallel, and which failing track is reported is then unspecified. Otherwise the first
    /// failing track in key order is reported.
    ///
    /// # Errors
    ///
    /// - [`ChartError::EventTrack`] if any instrument track fails to build.
    /// - [`ChartError::GlobalEvents`] if the global events fail to build.
    pub fn assemble(
        sync_track: SyncTrack,
        tracks: BTreeMap<TrackKey, Vec<TrackLine>>,
        global_events: Vec<GlobalEventLine>,
        config: &ChartConfig,
    ) -> Result<Self, ChartError> {
        let sync_track = Arc::new(sync_track);
        let tracks = build_tracks(&sync_track, tracks, config)?;
        let global_events =
            GlobalEventTrack::new(&sync_track, global_events).map_err(ChartError::GlobalEvents)?;
        log::debug!(
            "assembled chart: {} tracks, {} global events",
            tracks.len(),
            global_events.events().len()
        );
        Ok(Self {
            sync_track,
            tracks,
            global_events,
        })
    }

    /// The tempo map shared by every track.
    #[must_use]
    pub fn sync_track(&self) -> &SyncTrack {
        &self.sync_track
    }

    /// The track of `key`, if the chart has one.
    #[must_use]
    pub fn track(&self, key: TrackKey) -> Option<&EventTrack> {
        self.tracks.get(&key)
    }

    /// Every instrument track, in key order.
    #[must_use]
    pub const fn tracks(&self) -> &BTreeMap<TrackKey, EventTrack> {
        &self.tracks
    }

    /// The `[Events]` track.
    #[must_use]
    pub const fn global_events(&self) -> &GlobalEventTrack {
        &self.global_events
    }

    /// Shorthand for [`SyncTrack::timestamp_at`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidTick`] if `tick` is negative.
    pub fn timestamp_at(&self, tick: i64) -> Result<Seconds, BuildError> {
        self.sync_track.timestamp_at(tick)
    }

    /// Shorthand for [`SyncTrack::timestamp_at_tick`].
    #[must_use]
    pub fn timestamp_at_tick(&self, tick: Tick) -> Seconds {
        self.sync_track.timestamp_at_tick(tick)
    }
}

fn build_track(
    sync_track: &Arc<SyncTrack>,
    key: TrackKey,
    lines: Vec<TrackLine>,
) -> Result<(TrackKey, EventTrack), ChartError> {
    EventTrack::new(key, Arc::clone(sync_track), lines)
        .map(|track| (key, track))
        .map_err(|source| ChartError::EventTrack { track: key, source })
}

#[cfg(feature = "rayon")]
fn build_tracks(
    sync_track: &Arc<SyncTrack>,
    tracks: BTreeMap<TrackKey, Vec<TrackLine>>,
    config: &ChartConfig,
) -> Result<BTreeMap<TrackKey, EventTrack>, ChartError> {
    use rayon::prelude::*;

    if config.parallel {
        return tracks
            .into_par_iter()
            .map(|(key, lines)| build_track(sync_track, key, lines))
            .collect();
    }
    tracks
        .into_iter()
        .map(|(key, lines)| build_track(sync_track, key, lines))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn build_tracks(
    sync_track: &Arc<SyncTrack>,
    tracks: BTreeMap<TrackKey, Vec<TrackLine>>,
    config: &ChartConfig,
) -> Result<BTreeMap<TrackKey, EventTrack>, ChartError> {
    if config.parallel {
        log::debug!("parallel track building requested without the rayon feature");
    }
    tracks
        .into_iter()
        .map(|(key, lines)| build_track(sync_track, key, lines))
        .collect()
}
