//! The parser of Moonscraper/Clone Hero `.chart` files, resolving every event to the second at
//! which it happens.
//!
//! This crate consists of two phases: lexical analyzing and chart building.
//!
//! `lex` module splits the `.chart` text into its sections and turns each line into a raw,
//! tick-indexed payload, collected in a [`chart::RawChart`].
//!
//! `chart` module builds a [`chart::Chart`] out of those payloads. The tempo map is resolved once
//! into a [`sync::SyncTrack`], which is then shared by every instrument track so that all
//! timestamps come from the same place. Notes on one tick are merged into chords, sustains and
//! star power phrases get their length in seconds, and structural mistakes such as a lane
//! declared twice on one tick are reported as errors.
//!
//! In detail, our policies are:
//!
//! - Support only UTF-8 (as required `&str` to input). A leading byte order mark is skipped.
//! - Do not support editing or writing `.chart` files.
//! - Do not repair broken input. A chart is either built as a whole or not at all.
//! - Lines and sections this crate does not know are skipped with a warning.
//!
//! # Example
//!
//! ```
//! use chart_rs::{config::ChartConfig, parse_chart, tick::Tick};
//!
//! let source = "[Song]\n{\n  Resolution = 192\n}\n[SyncTrack]\n{\n  0 = TS 4\n  0 = B 120000\n  384 = B 240000\n}\n";
//! let output = parse_chart(source, &ChartConfig::default()).unwrap();
//! assert_eq!(output.chart.timestamp_at_tick(Tick(576)).as_f64(), 1.25);
//! ```

pub mod cache;
pub mod chart;
pub mod config;
pub mod error;
pub mod global;
pub mod lex;
pub mod prelude;
pub mod sync;
pub mod tick;
pub mod time;
pub mod track;

use thiserror::Error;

use self::{
    chart::Chart,
    config::ChartConfig,
    error::ChartError,
    lex::{LexError, LexOutput, LexWarning, SongHeader},
};

/// An error occurred when parsing the `.chart` format file.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// An error comes from lexical analyzer.
    #[error("lex: {0}")]
    Lex(#[from] LexError),
    /// An error comes from building the chart.
    #[error("chart: {0}")]
    Chart(#[from] ChartError),
}

/// Output of parsing a `.chart` file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    /// The built chart.
    pub chart: Chart,
    /// The `[Song]` section.
    pub header: SongHeader,
    /// Lines and sections skipped by the lexical analyzer.
    pub lex_warnings: Vec<LexWarning>,
}

/// Parses a `.chart` file from source text in one step.
///
/// # Errors
///
/// Returns [`ParseError::Lex`] if the text is malformed, and [`ParseError::Chart`] if its
/// contents do not form a valid chart.
pub fn parse_chart(source: &str, config: &ChartConfig) -> Result<ParseOutput, ParseError> {
    let LexOutput {
        header,
        raw,
        lex_warnings,
    } = lex::parse(source)?;
    let chart = Chart::from_raw(raw, config)?;
    Ok(ParseOutput {
        chart,
        header,
        lex_warnings,
    })
}
