//! Splitting of `<tick> = <code> <args...>` lines.

use std::{fmt, str::FromStr};

use super::{LexError, Result};

/// The code after `=` telling what a line declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventCode<'a> {
    /// `B`
    Tempo,
    /// `TS`
    TimeSignature,
    /// `A`
    Anchor,
    /// `E`
    Event,
    /// `N`
    Note,
    /// `S`
    Special,
    Other(&'a str),
}

impl<'a> From<&'a str> for EventCode<'a> {
    fn from(code: &'a str) -> Self {
        match code {
            "B" => Self::Tempo,
            "TS" => Self::TimeSignature,
            "A" => Self::Anchor,
            "E" => Self::Event,
            "N" => Self::Note,
            "S" => Self::Special,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for EventCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tempo => "B",
            Self::TimeSignature => "TS",
            Self::Anchor => "A",
            Self::Event => "E",
            Self::Note => "N",
            Self::Special => "S",
            Self::Other(other) => other,
        })
    }
}

/// The arguments following an event code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Args<'a> {
    line: usize,
    raw: &'a str,
    fields: Vec<&'a str>,
}

impl Args<'_> {
    /// Parses the `index`-th whitespace separated field.
    pub(crate) fn number<T: FromStr>(&self, index: usize, message: &'static str) -> Result<T> {
        self.optional_number(index, message)?
            .ok_or(LexError::MalformedLine {
                line: self.line,
                message,
            })
    }

    /// Parses the `index`-th whitespace separated field if there is one.
    pub(crate) fn optional_number<T: FromStr>(
        &self,
        index: usize,
        message: &'static str,
    ) -> Result<Option<T>> {
        self.fields
            .get(index)
            .map(|field| {
                field.parse().map_err(|_| LexError::MalformedLine {
                    line: self.line,
                    message,
                })
            })
            .transpose()
    }

    /// All arguments as one text, with surrounding quotes stripped.
    pub(crate) fn text(&self) -> &str {
        unquote(self.raw)
    }
}

/// One line inside a section body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub(crate) tick: i64,
    pub(crate) code: EventCode<'a>,
    pub(crate) args: Args<'a>,
}

impl<'a> Line<'a> {
    pub(crate) fn parse(line: usize, text: &'a str) -> Result<Self> {
        let (tick, rest) = text.split_once('=').ok_or(LexError::MalformedLine {
            line,
            message: "`<tick> = <code>`",
        })?;
        let tick = tick.trim().parse().map_err(|_| LexError::MalformedLine {
            line,
            message: "an integer tick",
        })?;
        let rest = rest.trim();
        let (code, raw) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        if code.is_empty() {
            return Err(LexError::MalformedLine {
                line,
                message: "an event code",
            });
        }
        let raw = raw.trim();
        Ok(Self {
            tick,
            code: code.into(),
            args: Args {
                line,
                raw,
                fields: raw.split_whitespace().collect(),
            },
        })
    }
}

/// Strips one pair of surrounding double quotes, if any.
pub(crate) fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_note_line() {
        let line = Line::parse(3, "768 = N 2 96").unwrap();
        assert_eq!(line.tick, 768);
        assert_eq!(line.code, EventCode::Note);
        assert_eq!(line.args.number::<u32>(0, "index"), Ok(2));
        assert_eq!(line.args.number::<u64>(1, "sustain"), Ok(96));
        assert_eq!(
            line.args.number::<u64>(2, "nothing"),
            Err(LexError::MalformedLine {
                line: 3,
                message: "nothing"
            })
        );
    }

    #[test]
    fn text_keeps_inner_spaces() {
        let line = Line::parse(1, "0 = E \"section Verse 1\"").unwrap();
        assert_eq!(line.code, EventCode::Event);
        assert_eq!(line.args.text(), "section Verse 1");
    }

    #[test]
    fn negative_tick_is_lexed() {
        assert_eq!(Line::parse(1, "-5 = B 120000").unwrap().tick, -5);
    }

    #[test]
    fn malformed() {
        assert_eq!(
            Line::parse(9, "768 N 0 0"),
            Err(LexError::MalformedLine {
                line: 9,
                message: "`<tick> = <code>`"
            })
        );
        assert_eq!(
            Line::parse(9, "x = N 0 0"),
            Err(LexError::MalformedLine {
                line: 9,
                message: "an integer tick"
            })
        );
        assert_eq!(
            Line::parse(9, "0 = "),
            Err(LexError::MalformedLine {
                line: 9,
                message: "an event code"
            })
        );
    }

    #[test]
    fn unquote_only_strips_pairs() {
        assert_eq!(unquote("\"a\""), "a");
        assert_eq!(unquote("\"a"), "\"a");
        assert_eq!(unquote("a"), "a");
    }
}
