//! The reducer turning raw [`TrackLine`]s into resolved notes, chords and phrases.

use std::collections::BTreeMap;

use itertools::Itertools;

use super::{
    Chord, EventLine, HopoState, Lane, ModifierKind, ModifierLine, NoteEvent, NoteFlags, NoteLine,
    PhraseLine, StarPowerEvent, TrackEvent, TrackLine,
};
use crate::{
    error::{BuildError, Result},
    sync::SyncTrack,
    tick::{Resolution, Tick},
};

pub(super) struct Built {
    pub(super) notes: Vec<NoteEvent>,
    pub(super) chords: Vec<Chord>,
    pub(super) star_power: Vec<StarPowerEvent>,
    pub(super) events: Vec<TrackEvent>,
}

#[derive(Clone, Copy)]
enum ChordLine {
    Note { lane: Lane, sustain: u64 },
    Modifier(ModifierKind),
}

pub(super) fn build(
    sync_track: &SyncTrack,
    lines: impl IntoIterator<Item = TrackLine>,
) -> Result<Built> {
    let mut chord_lines = vec![];
    let mut phrases = vec![];
    let mut events = vec![];
    for line in lines {
        let tick = Tick::try_from(line.tick())?;
        match line {
            TrackLine::Note(NoteLine { lane, sustain, .. }) => {
                chord_lines.push((tick, ChordLine::Note { lane, sustain }));
            }
            TrackLine::Modifier(ModifierLine { kind, .. }) => {
                chord_lines.push((tick, ChordLine::Modifier(kind)));
            }
            TrackLine::Phrase(PhraseLine { duration, .. }) => phrases.push((tick, duration)),
            TrackLine::Event(EventLine { text, .. }) => events.push((tick, text)),
        }
    }

    let star_power = build_star_power(sync_track, phrases)?;
    let (notes, chords) = build_chords(sync_track, chord_lines, &star_power)?;

    events.sort_by_key(|&(tick, _)| tick);
    let events = events
        .into_iter()
        .map(|(tick, text)| TrackEvent {
            tick,
            timestamp: sync_track.timestamp_at_tick(tick),
            text,
        })
        .collect();

    Ok(Built {
        notes,
        chords,
        star_power,
        events,
    })
}

fn build_chords(
    sync_track: &SyncTrack,
    mut lines: Vec<(Tick, ChordLine)>,
    star_power: &[StarPowerEvent],
) -> Result<(Vec<NoteEvent>, Vec<Chord>)> {
    lines.sort_by_key(|&(tick, _)| tick);

    let mut notes = Vec::with_capacity(lines.len());
    let mut chords: Vec<Chord> = vec![];
    let mut previous: Option<(Tick, u8)> = None;
    let mut phrase_index = 0;

    for (tick, group) in &lines.iter().chunk_by(|&&(tick, _)| tick) {
        let mut lanes = BTreeMap::new();
        let mut flags = NoteFlags::default();
        let mut first_modifier = None;
        for &(_, line) in group {
            match line {
                ChordLine::Note { lane, sustain } => {
                    if lanes.insert(lane, sustain).is_some() {
                        return Err(BuildError::DuplicateLane { tick: tick.0, lane });
                    }
                }
                ChordLine::Modifier(kind) => {
                    first_modifier.get_or_insert(kind);
                    match kind {
                        ModifierKind::Forced => flags.forced = true,
                        ModifierKind::Unforced => flags.forced = false,
                        ModifierKind::Tap => flags.tap = true,
                    }
                }
            }
        }
        if lanes.is_empty() {
            if let Some(kind) = first_modifier {
                return Err(BuildError::OrphanModifier { tick: tick.0, kind });
            }
            continue;
        }

        let timestamp = sync_track.timestamp_at_tick(tick);
        let start = notes.len();
        let mut end_tick = tick;
        let mut lane_bits = 0;
        for (&lane, &sustain) in &lanes {
            let sustain_end = tick.checked_add(sustain)?;
            end_tick = end_tick.max(sustain_end);
            lane_bits |= lane.bit();
            notes.push(NoteEvent {
                tick,
                timestamp,
                lane,
                sustain,
                sustain_length: sync_track.timestamp_at_tick(sustain_end) - timestamp,
                flags,
            });
        }

        let hopo_state = hopo_state(
            sync_track.resolution(),
            previous,
            tick,
            lane_bits,
            lanes.len(),
            flags,
        )?;
        previous = Some((tick, lane_bits));

        while star_power
            .get(phrase_index)
            .is_some_and(|phrase| phrase.tick.0.saturating_add(phrase.duration) <= tick.0)
        {
            phrase_index += 1;
        }
        let phrase = star_power
            .get(phrase_index)
            .filter(|phrase| phrase.contains(tick))
            .map(|_| phrase_index);

        chords.push(Chord {
            tick,
            timestamp,
            notes: start..notes.len(),
            flags,
            hopo_state,
            star_power: phrase,
            end_tick,
            end_timestamp: sync_track.timestamp_at_tick(end_tick),
        });
    }
    Ok((notes, chords))
}

/// Decides how a chord is played from the chord before it.
///
/// A single note close enough to a different previous chord is a natural hammer-on or pull-off,
/// and forcing inverts that.
fn hopo_state(
    resolution: Resolution,
    previous: Option<(Tick, u8)>,
    tick: Tick,
    lane_bits: u8,
    lane_count: usize,
    flags: NoteFlags,
) -> Result<HopoState> {
    if flags.forced && previous.is_none() {
        return Err(BuildError::ForcedFirstNote { tick: tick.0 });
    }
    if flags.tap {
        return Ok(HopoState::Tap);
    }
    let Some((previous_tick, previous_bits)) = previous else {
        return Ok(HopoState::Strum);
    };
    let natural = lane_count == 1
        && lane_bits != previous_bits
        && previous_tick.ticks_until(tick) <= resolution.eighth_triplet();
    Ok(if natural == flags.forced {
        HopoState::Strum
    } else {
        HopoState::Hopo
    })
}

fn build_star_power(
    sync_track: &SyncTrack,
    mut phrases: Vec<(Tick, u64)>,
) -> Result<Vec<StarPowerEvent>> {
    phrases.sort_by_key(|&(tick, _)| tick);

    // The phrase reaching furthest so far; zero-length phrases cover nothing.
    let mut furthest: Option<(Tick, u64, Tick)> = None;
    for &(tick, duration) in &phrases {
        if duration == 0 {
            continue;
        }
        let end = tick.checked_add(duration)?;
        if let Some((first_tick, first_duration, _)) =
            furthest.filter(|&(_, _, first_end)| tick < first_end)
        {
            return Err(BuildError::OverlappingPhrase {
                first: (first_tick.0, first_duration),
                second: (tick.0, duration),
            });
        }
        furthest = Some((tick, duration, end));
    }

    Ok(phrases
        .into_iter()
        .map(|(tick, duration)| {
            let timestamp = sync_track.timestamp_at_tick(tick);
            StarPowerEvent {
                tick,
                timestamp,
                duration,
                length: sync_track.timestamp_at_tick(Tick(tick.0.saturating_add(duration)))
                    - timestamp,
            }
        })
        .collect())
}
