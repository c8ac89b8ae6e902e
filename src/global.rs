//! The `[Events]` track: section markers, lyrics and free text shared by every instrument.

use crate::{error::Result, sync::SyncTrack, tick::Tick, time::Seconds};

/// A global event as declared in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalEventLine {
    /// Where the event is.
    pub tick: i64,
    /// The raw event text, such as `section Intro`.
    pub text: String,
}

/// What a global event marks, classified from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GlobalEventKind {
    /// `section <name>`: the start of a practice section.
    Section,
    /// `lyric <syllable>`: one syllable of the vocals.
    Lyric,
    /// Anything else, such as `phrase_start`.
    Text,
}

impl GlobalEventKind {
    const SECTION_PREFIX: &'static str = "section ";
    const LYRIC_PREFIX: &'static str = "lyric ";

    /// Classifies the raw text of an event.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        if text.starts_with(Self::SECTION_PREFIX) {
            Self::Section
        } else if text.starts_with(Self::LYRIC_PREFIX) {
            Self::Lyric
        } else {
            Self::Text
        }
    }
}

/// A resolved global event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalEvent {
    /// Where the event is.
    pub tick: Tick,
    /// When the event is.
    pub timestamp: Seconds,
    /// What the event marks.
    pub kind: GlobalEventKind,
    /// The raw event text.
    pub text: String,
}

impl GlobalEvent {
    /// The text without its `section ` or `lyric ` prefix.
    #[must_use]
    pub fn value(&self) -> &str {
        let prefix = match self.kind {
            GlobalEventKind::Section => GlobalEventKind::SECTION_PREFIX,
            GlobalEventKind::Lyric => GlobalEventKind::LYRIC_PREFIX,
            GlobalEventKind::Text => "",
        };
        self.text.strip_prefix(prefix).unwrap_or(&self.text)
    }
}

/// Every global event of a chart, sorted by tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalEventTrack {
    events: Vec<GlobalEvent>,
}

impl GlobalEventTrack {
    /// Timestamps every line. Lines on the same tick keep their declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BuildError::InvalidTick`] if a tick is negative.
    pub fn new(
        sync_track: &SyncTrack,
        lines: impl IntoIterator<Item = GlobalEventLine>,
    ) -> Result<Self> {
        let mut lines = lines
            .into_iter()
            .map(|GlobalEventLine { tick, text }| Ok((Tick::try_from(tick)?, text)))
            .collect::<Result<Vec<_>>>()?;
        lines.sort_by_key(|&(tick, _)| tick);
        let events = lines
            .into_iter()
            .map(|(tick, text)| GlobalEvent {
                tick,
                timestamp: sync_track.timestamp_at_tick(tick),
                kind: GlobalEventKind::classify(&text),
                text,
            })
            .collect();
        Ok(Self { events })
    }

    /// Every event, sorted by tick.
    #[must_use]
    pub fn events(&self) -> &[GlobalEvent] {
        &self.events
    }

    /// Section markers, sorted by tick.
    pub fn sections(&self) -> impl Iterator<Item = &GlobalEvent> {
        self.of_kind(GlobalEventKind::Section)
    }

    /// Lyrics, sorted by tick.
    pub fn lyrics(&self) -> impl Iterator<Item = &GlobalEvent> {
        self.of_kind(GlobalEventKind::Lyric)
    }

    fn of_kind(&self, kind: GlobalEventKind) -> impl Iterator<Item = &GlobalEvent> {
        self.events.iter().filter(move |event| event.kind == kind)
    }
}
