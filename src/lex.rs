//! Lexical analyzer of the `.chart` format.
//!
//! A `.chart` file is a list of sections, each a bracketed name followed by a braced body:
//!
//! ```text
//! [Song]
//! {
//!   Resolution = 192
//! }
//! [SyncTrack]
//! {
//!   0 = TS 4
//!   0 = B 120000
//! }
//! [ExpertSingle]
//! {
//!   768 = N 0 0
//!   768 = S 2 192
//! }
//! ```
//!
//! [`parse`] splits the text into sections and turns every body line into the raw payloads of
//! [`RawChart`]. Lines it does not understand are skipped with a [`LexWarning`], while lines it
//! cannot even split are a [`LexError`].

mod line;
mod section;

use std::collections::BTreeMap;

use thiserror::Error;

use self::{
    line::{EventCode, Line, unquote},
    section::Section,
};
use crate::{
    chart::RawChart,
    global::GlobalEventLine,
    sync::{RawTempo, RawTimeSignature},
    time::Bpm,
    track::{EventLine, Lane, ModifierKind, ModifierLine, NoteLine, PhraseLine, TrackKey, TrackLine},
};

/// An error occurred when lexical analysis.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum LexError {
    /// A line outside of any section was not a `[Name]` header.
    #[error("expected a section header at line {line}")]
    ExpectedSectionHeader {
        /// The line number.
        line: usize,
    },
    /// A section header was not followed by `{`.
    #[error("expected `{{` after section header at line {line}")]
    ExpectedOpenBrace {
        /// The line number.
        line: usize,
    },
    /// The input ended inside a section.
    #[error("section [{name}] starting at line {line} is never closed")]
    UnclosedSection {
        /// The line number of the section header.
        line: usize,
        /// The section name.
        name: String,
    },
    /// A line inside a section could not be split into its fields.
    #[error("expected {message} at line {line}")]
    MalformedLine {
        /// The line number.
        line: usize,
        /// What the expected is.
        message: &'static str,
    },
    /// The `[Song]` section has no `Resolution`.
    #[error("the [Song] section has no Resolution")]
    MissingResolution,
}

/// A non-fatal problem found when lexical analysis. The offending line is skipped.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LexWarning {
    /// A section with a name not known to this crate.
    #[error("unknown section [{name}] at line {line}")]
    UnknownSection {
        /// The line number of the section header.
        line: usize,
        /// The section name.
        name: String,
    },
    /// A section appearing for the second time.
    #[error("duplicate section [{name}] at line {line}")]
    DuplicateSection {
        /// The line number of the section header.
        line: usize,
        /// The section name.
        name: String,
    },
    /// An `N` line with a note index which is neither a lane nor a modifier.
    #[error("unknown note index {index} at line {line}")]
    UnknownNoteIndex {
        /// The line number.
        line: usize,
        /// The note index.
        index: u32,
    },
    /// An `S` line with a kind other than star power.
    #[error("unknown special phrase kind {kind} at line {line}")]
    UnknownPhraseKind {
        /// The line number.
        line: usize,
        /// The phrase kind.
        kind: u32,
    },
    /// An event code not expected in its section.
    #[error("unexpected event code {code} at line {line}")]
    UnknownEventCode {
        /// The line number.
        line: usize,
        /// The event code.
        code: String,
    },
}

/// An error occurred when lexical analyzing the `.chart` format file.
pub type Result<T> = std::result::Result<T, LexError>;

/// The `[Song]` section.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SongHeader {
    /// Ticks per quarter note.
    pub resolution: u32,
    /// Seconds of audio before tick 0.
    pub offset: Option<f64>,
    /// Every `Key = Value` pair, including the ones above, with quotes stripped.
    pub values: BTreeMap<String, String>,
}

impl SongHeader {
    /// Looks up a raw value, such as `Name` or `Artist`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// The result of lexical analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LexOutput {
    /// The `[Song]` section.
    pub header: SongHeader,
    /// Every timing relevant section.
    pub raw: RawChart,
    /// Warnings for skipped lines and sections.
    pub lex_warnings: Vec<LexWarning>,
}

/// Analyzes the `.chart` format text into its raw sections.
///
/// # Errors
///
/// Returns a [`LexError`] if the section structure is broken, a line cannot be split, or the
/// `[Song]` section has no resolution.
pub fn parse(source: &str) -> Result<LexOutput> {
    let mut header = None;
    let mut raw = RawChart::default();
    let mut lex_warnings = vec![];
    let mut seen = BTreeMap::new();

    for section in section::split(source)? {
        if let Some(&first) = seen.get(section.name) {
            log::warn!(
                "skipping duplicate section [{}] at line {}, first seen at line {first}",
                section.name,
                section.line
            );
            lex_warnings.push(LexWarning::DuplicateSection {
                line: section.line,
                name: section.name.to_owned(),
            });
            continue;
        }
        seen.insert(section.name, section.line);

        match section.name {
            "Song" => header = Some(parse_song(&section)?),
            "SyncTrack" => parse_sync_track(&section, &mut raw, &mut lex_warnings)?,
            "Events" => parse_events(&section, &mut raw, &mut lex_warnings)?,
            name => {
                if let Some(key) = TrackKey::from_section_name(name) {
                    let lines = parse_track(&section, &mut lex_warnings)?;
                    raw.tracks.insert(key, lines);
                } else {
                    log::warn!("skipping unknown section [{name}] at line {}", section.line);
                    lex_warnings.push(LexWarning::UnknownSection {
                        line: section.line,
                        name: name.to_owned(),
                    });
                }
            }
        }
    }

    let header = header.ok_or(LexError::MissingResolution)?;
    raw.resolution = header.resolution;
    Ok(LexOutput {
        header,
        raw,
        lex_warnings,
    })
}

fn parse_song(section: &Section) -> Result<SongHeader> {
    let mut values = BTreeMap::new();
    let mut resolution = None;
    let mut offset = None;
    for &(line, text) in &section.lines {
        let (key, value) = text.split_once('=').ok_or(LexError::MalformedLine {
            line,
            message: "`Key = Value`",
        })?;
        let key = key.trim();
        let value = unquote(value.trim());
        match key {
            "Resolution" => {
                resolution = Some(value.parse::<u32>().map_err(|_| LexError::MalformedLine {
                    line,
                    message: "an integer resolution",
                })?);
            }
            "Offset" => {
                offset = Some(value.parse::<f64>().map_err(|_| LexError::MalformedLine {
                    line,
                    message: "a number of seconds as offset",
                })?);
            }
            _ => {}
        }
        values.insert(key.to_owned(), value.to_owned());
    }
    Ok(SongHeader {
        resolution: resolution.ok_or(LexError::MissingResolution)?,
        offset,
        values,
    })
}

fn parse_sync_track(
    section: &Section,
    raw: &mut RawChart,
    lex_warnings: &mut Vec<LexWarning>,
) -> Result<()> {
    for &(line, text) in &section.lines {
        let Line { tick, code, args } = Line::parse(line, text)?;
        match code {
            EventCode::Tempo => {
                let millibeats = args.number::<u64>(0, "tempo in thousandths of BPM")?;
                raw.tempos.push(RawTempo {
                    tick,
                    bpm: Bpm::from_millibeats(millibeats).map_or(0.0, Bpm::as_f64),
                });
            }
            EventCode::TimeSignature => {
                let numerator = args.number::<u32>(0, "time signature numerator")?;
                let denominator = match args.optional_number::<u32>(1, "time signature exponent")? {
                    Some(exponent) => 1u32.checked_shl(exponent).ok_or(LexError::MalformedLine {
                        line,
                        message: "a time signature exponent below 32",
                    })?,
                    None => 4,
                };
                raw.time_signatures.push(RawTimeSignature {
                    tick,
                    numerator,
                    denominator,
                });
            }
            EventCode::Anchor => log::debug!("ignoring anchor at line {line}"),
            code => skip_code(line, code, lex_warnings),
        }
    }
    Ok(())
}

fn parse_events(
    section: &Section,
    raw: &mut RawChart,
    lex_warnings: &mut Vec<LexWarning>,
) -> Result<()> {
    for &(line, text) in &section.lines {
        let Line { tick, code, args } = Line::parse(line, text)?;
        match code {
            EventCode::Event => raw.global_events.push(GlobalEventLine {
                tick,
                text: args.text().to_owned(),
            }),
            code => skip_code(line, code, lex_warnings),
        }
    }
    Ok(())
}

fn parse_track(section: &Section, lex_warnings: &mut Vec<LexWarning>) -> Result<Vec<TrackLine>> {
    let mut lines = Vec::with_capacity(section.lines.len());
    for &(line, text) in &section.lines {
        let Line { tick, code, args } = Line::parse(line, text)?;
        match code {
            EventCode::Note => {
                let index = args.number::<u32>(0, "note index")?;
                let sustain = args.number::<u64>(1, "sustain length")?;
                let parsed = match index {
                    5 => ModifierLine {
                        tick,
                        kind: ModifierKind::Forced,
                    }
                    .into(),
                    6 => ModifierLine {
                        tick,
                        kind: ModifierKind::Tap,
                    }
                    .into(),
                    index => {
                        let Some(lane) = Lane::from_note_index(index) else {
                            log::warn!("skipping unknown note index {index} at line {line}");
                            lex_warnings.push(LexWarning::UnknownNoteIndex { line, index });
                            continue;
                        };
                        NoteLine {
                            tick,
                            lane,
                            sustain,
                        }
                        .into()
                    }
                };
                lines.push(parsed);
            }
            EventCode::Special => {
                let kind = args.number::<u32>(0, "special phrase kind")?;
                let duration = args.number::<u64>(1, "special phrase length")?;
                if kind != 2 {
                    log::warn!("skipping special phrase of kind {kind} at line {line}");
                    lex_warnings.push(LexWarning::UnknownPhraseKind { line, kind });
                    continue;
                }
                lines.push(PhraseLine { tick, duration }.into());
            }
            EventCode::Event => lines.push(
                EventLine {
                    tick,
                    text: args.text().to_owned(),
                }
                .into(),
            ),
            code => skip_code(line, code, lex_warnings),
        }
    }
    Ok(lines)
}

fn skip_code(line: usize, code: EventCode, lex_warnings: &mut Vec<LexWarning>) {
    log::warn!("skipping unexpected event code {code} at line {line}");
    lex_warnings.push(LexWarning::UnknownEventCode {
        line,
        code: code.to_string(),
    });
}
