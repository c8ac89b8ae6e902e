//! Splitting of the source into `[Name] { ... }` sections.

use super::{LexError, Result};

/// One section with its body lines, each paired with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Section<'a> {
    pub(crate) name: &'a str,
    pub(crate) line: usize,
    pub(crate) lines: Vec<(usize, &'a str)>,
}

enum State<'a> {
    Outside,
    ExpectingBrace { name: &'a str, line: usize },
    Inside(Section<'a>),
}

pub(crate) fn split(source: &str) -> Result<Vec<Section<'_>>> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut sections = vec![];
    let mut state = State::Outside;

    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        state = match state {
            State::Outside => {
                let name = text
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .ok_or(LexError::ExpectedSectionHeader { line })?;
                State::ExpectingBrace {
                    name: name.trim(),
                    line,
                }
            }
            State::ExpectingBrace { name, line: header } => {
                if text != "{" {
                    return Err(LexError::ExpectedOpenBrace { line });
                }
                State::Inside(Section {
                    name,
                    line: header,
                    lines: vec![],
                })
            }
            State::Inside(section) if text == "}" => {
                sections.push(section);
                State::Outside
            }
            State::Inside(mut section) => {
                section.lines.push((line, text));
                State::Inside(section)
            }
        };
    }

    match state {
        State::Outside => Ok(sections),
        State::ExpectingBrace { name, line } => Err(LexError::UnclosedSection {
            line,
            name: name.to_owned(),
        }),
        State::Inside(Section { name, line, .. }) => Err(LexError::UnclosedSection {
            line,
            name: name.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sections() {
        let sections = split("[A]\n{\n  0 = E x\n\n}\r\n[B]\r\n{\r\n}\r\n").unwrap();
        assert_eq!(
            sections,
            vec![
                Section {
                    name: "A",
                    line: 1,
                    lines: vec![(3, "0 = E x")],
                },
                Section {
                    name: "B",
                    line: 6,
                    lines: vec![],
                },
            ]
        );
    }

    #[test]
    fn structure_errors() {
        assert_eq!(
            split("0 = B 1\n"),
            Err(LexError::ExpectedSectionHeader { line: 1 })
        );
        assert_eq!(
            split("[A]\n0 = B 1\n"),
            Err(LexError::ExpectedOpenBrace { line: 2 })
        );
        assert_eq!(
            split("[A]\n{\n0 = B 1\n"),
            Err(LexError::UnclosedSection {
                line: 1,
                name: "A".to_owned()
            })
        );
    }
}
