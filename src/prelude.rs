//! Prelude module for the crate.
//!
//! You can use `use chart_rs::prelude::*;` to import the commonly used types at once.

pub use crate::{
    ParseError, ParseOutput,
    cache::{ChartCache, ContentHash},
    chart::{Chart, RawChart},
    config::{ChartConfig, InitialEventPolicy},
    error::{BuildError, ChartError, SyncEventKind},
    global::{GlobalEvent, GlobalEventKind, GlobalEventLine, GlobalEventTrack},
    lex::{LexError, LexOutput, LexWarning, SongHeader},
    parse_chart,
    sync::{
        RawTempo, RawTimeSignature, SyncTrack, TempoEvent, TimeSignature, TimeSignatureEvent,
    },
    tick::{Resolution, Tick, seconds_between},
    time::{Bpm, OutOfDomain, Seconds},
    track::{
        Chord, Difficulty, EventLine, EventTrack, HopoState, Instrument, Lane, ModifierKind,
        ModifierLine, NoteEvent, NoteFlags, NoteLine, PhraseLine, StarPowerEvent, TrackEvent,
        TrackKey, TrackLine,
    },
};
