//! Instrument tracks: the notes, star power phrases and text events of one instrument at one
//! difficulty, every one of them stamped with its timestamp.
//!
//! A track is built from a list of [`TrackLine`]s by [`EventTrack::new`]. Lines sharing a tick
//! are merged into one [`Chord`], whose flags come from the modifier lines on that tick.

mod builder;

use std::{fmt, ops::Range, sync::Arc};

use crate::{
    error::{BuildError, Result},
    sync::SyncTrack,
    tick::Tick,
    time::Seconds,
};

/// The fret (or pad) a note is played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lane {
    /// The leftmost fret.
    Green,
    /// The second fret.
    Red,
    /// The third fret.
    Yellow,
    /// The fourth fret.
    Blue,
    /// The fifth fret.
    Orange,
    /// A strum with no fret held.
    Open,
}

impl Lane {
    /// Maps a `.chart` note index to its lane. Indices 5 and 6 are modifiers, not lanes.
    #[must_use]
    pub const fn from_note_index(index: u32) -> Option<Self> {
        Some(match index {
            0 => Self::Green,
            1 => Self::Red,
            2 => Self::Yellow,
            3 => Self::Blue,
            4 => Self::Orange,
            7 => Self::Open,
            _ => return None,
        })
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A directive applying to the whole chord on its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierKind {
    /// Inverts the natural hammer-on/pull-off state of the chord.
    Forced,
    /// Cancels an earlier [`ModifierKind::Forced`] on the same tick.
    Unforced,
    /// Makes the chord a tap note.
    Tap,
}

/// The instrument part of a track's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Instrument {
    /// Lead guitar.
    Single,
    /// Co-op guitar.
    DoubleGuitar,
    /// Bass guitar.
    DoubleBass,
    /// Rhythm guitar.
    DoubleRhythm,
    /// Keyboard.
    Keyboard,
    /// Drums.
    Drums,
    /// Six-fret lead guitar.
    GHLGuitar,
    /// Six-fret bass guitar.
    GHLBass,
    /// Six-fret co-op guitar.
    GHLCoop,
    /// Six-fret rhythm guitar.
    GHLRhythm,
}

impl Instrument {
    /// Every instrument, in section order.
    pub const ALL: [Self; 10] = [
        Self::Single,
        Self::DoubleGuitar,
        Self::DoubleBass,
        Self::DoubleRhythm,
        Self::Keyboard,
        Self::Drums,
        Self::GHLGuitar,
        Self::GHLBass,
        Self::GHLCoop,
        Self::GHLRhythm,
    ];

    /// The suffix of `.chart` section names for this instrument.
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::DoubleGuitar => "DoubleGuitar",
            Self::DoubleBass => "DoubleBass",
            Self::DoubleRhythm => "DoubleRhythm",
            Self::Keyboard => "Keyboard",
            Self::Drums => "Drums",
            Self::GHLGuitar => "GHLGuitar",
            Self::GHLBass => "GHLBass",
            Self::GHLCoop => "GHLCoop",
            Self::GHLRhythm => "GHLRhythm",
        }
    }
}

/// The difficulty part of a track's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    /// Easy.
    Easy,
    /// Medium.
    Medium,
    /// Hard.
    Hard,
    /// Expert.
    Expert,
}

impl Difficulty {
    /// Every difficulty, easiest first.
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    /// The prefix of `.chart` section names for this difficulty.
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
        }
    }
}

/// Identifies one instrument track of a chart.
///
/// With the `serde` feature, it is represented by its section name such as `ExpertSingle`, so
/// that it can be a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackKey {
    /// The instrument.
    pub instrument: Instrument,
    /// The difficulty.
    pub difficulty: Difficulty,
}

impl TrackKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(instrument: Instrument, difficulty: Difficulty) -> Self {
        Self {
            instrument,
            difficulty,
        }
    }

    /// Parses a `.chart` section name such as `ExpertSingle`.
    #[must_use]
    pub fn from_section_name(name: &str) -> Option<Self> {
        Difficulty::ALL.into_iter().find_map(|difficulty| {
            let rest = name.strip_prefix(difficulty.section_name())?;
            let instrument = Instrument::ALL
                .into_iter()
                .find(|instrument| instrument.section_name() == rest)?;
            Some(Self::new(instrument, difficulty))
        })
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.difficulty.section_name(),
            self.instrument.section_name()
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TrackKey {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TrackKey {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_section_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown track section name {name}")))
    }
}

/// A note as declared in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteLine {
    /// Where the note is.
    pub tick: i64,
    /// Which lane it is on.
    pub lane: Lane,
    /// How long it is held, in ticks. Zero for no sustain.
    pub sustain: u64,
}

/// A chord modifier as declared in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierLine {
    /// The tick of the chord to modify.
    pub tick: i64,
    /// What to do to it.
    pub kind: ModifierKind,
}

/// A star power phrase as declared in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhraseLine {
    /// Where the phrase starts.
    pub tick: i64,
    /// How long it lasts, in ticks.
    pub duration: u64,
}

/// A text event inside an instrument section, as declared in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventLine {
    /// Where the event is.
    pub tick: i64,
    /// The event text, such as `solo`.
    pub text: String,
}

/// One raw line of an instrument section.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackLine {
    /// A note.
    Note(NoteLine),
    /// A chord modifier.
    Modifier(ModifierLine),
    /// A star power phrase.
    Phrase(PhraseLine),
    /// A text event.
    Event(EventLine),
}

impl TrackLine {
    /// The raw tick of the line.
    #[must_use]
    pub const fn tick(&self) -> i64 {
        match self {
            Self::Note(NoteLine { tick, .. })
            | Self::Modifier(ModifierLine { tick, .. })
            | Self::Phrase(PhraseLine { tick, .. })
            | Self::Event(EventLine { tick, .. }) => *tick,
        }
    }
}

impl From<NoteLine> for TrackLine {
    fn from(value: NoteLine) -> Self {
        Self::Note(value)
    }
}

impl From<ModifierLine> for TrackLine {
    fn from(value: ModifierLine) -> Self {
        Self::Modifier(value)
    }
}

impl From<PhraseLine> for TrackLine {
    fn from(value: PhraseLine) -> Self {
        Self::Phrase(value)
    }
}

impl From<EventLine> for TrackLine {
    fn from(value: EventLine) -> Self {
        Self::Event(value)
    }
}

/// Chord-scoped flags set by modifier lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteFlags {
    /// The natural hammer-on/pull-off state is inverted.
    pub forced: bool,
    /// The chord is a tap note.
    pub tap: bool,
}

/// How a chord is meant to be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HopoState {
    /// Strummed.
    Strum,
    /// Hammered on or pulled off from the previous chord.
    Hopo,
    /// Tapped.
    Tap,
}

/// One resolved note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteEvent {
    /// Where the note is.
    pub tick: Tick,
    /// When the note is.
    pub timestamp: Seconds,
    /// Which lane it is on.
    pub lane: Lane,
    /// How long it is held, in ticks.
    pub sustain: u64,
    /// How long it is held, in seconds.
    pub sustain_length: Seconds,
    /// Flags of the chord this note belongs to.
    pub flags: NoteFlags,
}

impl NoteEvent {
    /// The tick at which the sustain ends.
    #[must_use]
    pub const fn end_tick(&self) -> Tick {
        Tick(self.tick.0.saturating_add(self.sustain))
    }

    /// The timestamp at which the sustain ends.
    #[must_use]
    pub fn end_timestamp(&self) -> Seconds {
        self.timestamp + self.sustain_length
    }
}

/// All notes on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chord {
    /// Where the chord is.
    pub tick: Tick,
    /// When the chord is.
    pub timestamp: Seconds,
    /// Indices of the chord's notes in [`EventTrack::notes`].
    pub notes: Range<usize>,
    /// Flags of the chord.
    pub flags: NoteFlags,
    /// How the chord is played.
    pub hopo_state: HopoState,
    /// Index into [`EventTrack::star_power_events`] of the phrase containing this chord.
    pub star_power: Option<usize>,
    /// Where the longest sustain of the chord ends.
    pub end_tick: Tick,
    /// When the longest sustain of the chord ends.
    pub end_timestamp: Seconds,
}

/// A star power phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StarPowerEvent {
    /// Where the phrase starts.
    pub tick: Tick,
    /// When the phrase starts.
    pub timestamp: Seconds,
    /// How long it lasts, in ticks.
    pub duration: u64,
    /// How long it lasts, in seconds.
    pub length: Seconds,
}

impl StarPowerEvent {
    /// Whether `tick` is inside `[tick, tick + duration)`.
    #[must_use]
    pub const fn contains(&self, tick: Tick) -> bool {
        self.tick.0 <= tick.0 && tick.0 < self.tick.0.saturating_add(self.duration)
    }
}

/// A text event inside an instrument track.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackEvent {
    /// Where the event is.
    pub tick: Tick,
    /// When the event is.
    pub timestamp: Seconds,
    /// The event text.
    pub text: String,
}

/// The resolved contents of one instrument at one difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTrack {
    key: TrackKey,
    sync_track: Arc<SyncTrack>,
    notes: Vec<NoteEvent>,
    chords: Vec<Chord>,
    star_power: Vec<StarPowerEvent>,
    events: Vec<TrackEvent>,
}

impl EventTrack {
    /// Builds a track from its raw lines, in declaration order.
    ///
    /// # Errors
    ///
    /// - [`BuildError::InvalidTick`] if a tick is negative.
    /// - [`BuildError::TickOverflow`] if a sustain or phrase reaches past the last tick.
    /// - [`BuildError::DuplicateLane`] if a lane is declared twice on one tick.
    /// - [`BuildError::OrphanModifier`] if a modifier is on a tick with no note.
    /// - [`BuildError::ForcedFirstNote`] if the first chord is forced.
    /// - [`BuildError::OverlappingPhrase`] if two star power phrases intersect.
    pub fn new(
        key: TrackKey,
        sync_track: Arc<SyncTrack>,
        lines: impl IntoIterator<Item = TrackLine>,
    ) -> Result<Self> {
        let built = builder::build(&sync_track, lines)?;
        log::debug!(
            "built {key}: {} notes in {} chords, {} star power phrases, {} events",
            built.notes.len(),
            built.chords.len(),
            built.star_power.len(),
            built.events.len(),
        );
        Ok(Self {
            key,
            sync_track,
            notes: built.notes,
            chords: built.chords,
            star_power: built.star_power,
            events: built.events,
        })
    }

    /// The instrument and difficulty of this track.
    #[must_use]
    pub const fn key(&self) -> TrackKey {
        self.key
    }

    /// The sync track timestamps were taken from.
    #[must_use]
    pub fn sync_track(&self) -> &SyncTrack {
        &self.sync_track
    }

    /// Every note, sorted by tick and then by lane.
    #[must_use]
    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    /// Every chord, sorted by tick.
    #[must_use]
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// The notes of `chord`, sorted by lane.
    #[must_use]
    pub fn chord_notes(&self, chord: &Chord) -> &[NoteEvent] {
        self.notes.get(chord.notes.clone()).unwrap_or_default()
    }

    /// Star power phrases, sorted by tick and pairwise disjoint.
    #[must_use]
    pub fn star_power_events(&self) -> &[StarPowerEvent] {
        &self.star_power
    }

    /// Text events, sorted by tick. Events on the same tick keep their declaration order.
    #[must_use]
    pub fn track_events(&self) -> &[TrackEvent] {
        &self.events
    }

    /// When the last sustain of the track ends, or `None` if the track has no notes.
    #[must_use]
    pub fn last_note_end_timestamp(&self) -> Option<Seconds> {
        self.chords.iter().map(|chord| chord.end_timestamp).max()
    }

    /// Average chords per second over the closed interval `[start, end]`.
    ///
    /// `start` defaults to the beginning of the track and `end` to
    /// [`Self::last_note_end_timestamp`]. A chord counts once however many notes it has.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyInterval`] if the interval has no length, which includes a
    /// track without notes and no explicit `end`.
    pub fn notes_per_second(&self, start: Option<Seconds>, end: Option<Seconds>) -> Result<f64> {
        let start = start.unwrap_or(Seconds::ZERO);
        let end = end
            .or_else(|| self.last_note_end_timestamp())
            .unwrap_or(Seconds::ZERO);
        if end <= start {
            return Err(BuildError::EmptyInterval {
                start: start.as_f64(),
                end: end.as_f64(),
            });
        }
        let count = self
            .chords
            .iter()
            .filter(|chord| (start..=end).contains(&chord.timestamp))
            .count();
        Ok(count as f64 / (end - start).as_f64())
    }
}
