use chart_rs::prelude::*;
use pretty_assertions::assert_eq;

const SAMPLE: &str = include_str!("files/sample.chart");

fn secs(value: f64) -> Seconds {
    Seconds::new(value).unwrap()
}

#[test]
fn sample_chart() {
    let ParseOutput {
        chart,
        header,
        lex_warnings,
    } = parse_chart(SAMPLE, &ChartConfig::default()).unwrap();

    assert_eq!(lex_warnings, vec![]);
    assert_eq!(header.resolution, 192);
    assert_eq!(header.offset, Some(0.0));
    assert_eq!(header.get("Name"), Some("Sample"));
    assert_eq!(header.get("Player2"), Some("bass"));

    let sync_track = chart.sync_track();
    assert_eq!(sync_track.tempo_events().len(), 3);
    assert_eq!(chart.timestamp_at_tick(Tick(768)), secs(2.0));
    assert_eq!(chart.timestamp_at_tick(Tick(1536)), secs(3.0));
    assert_eq!(
        sync_track.time_signature_at(Tick(1536)),
        TimeSignature::new(3, 4).unwrap()
    );
    assert_eq!(sync_track.time_signature_events()[1].timestamp, secs(3.0));

    assert_eq!(chart.tracks().len(), 3);
    let track = chart
        .track(TrackKey::new(Instrument::Single, Difficulty::Expert))
        .unwrap();
    let states: Vec<_> = track.chords().iter().map(|chord| chord.hopo_state).collect();
    assert_eq!(
        states,
        vec![
            HopoState::Strum,
            HopoState::Strum,
            HopoState::Hopo,
            HopoState::Hopo,
            HopoState::Tap,
            HopoState::Strum,
            HopoState::Strum,
            HopoState::Strum,
            HopoState::Strum,
        ]
    );
    let star_power: Vec<_> = track.chords().iter().map(|chord| chord.star_power).collect();
    assert_eq!(
        star_power,
        vec![None, None, None, None, None, Some(0), Some(0), None, None]
    );

    let solo = &track.chords()[5];
    assert_eq!(solo.timestamp, secs(2.0));
    assert_eq!(solo.end_timestamp, secs(2.5));
    assert_eq!(track.chord_notes(solo)[0].lane, Lane::Orange);
    assert_eq!(track.chord_notes(solo)[0].sustain_length, secs(0.5));
    assert_eq!(track.star_power_events()[0].length, secs(0.5));

    assert_eq!(track.last_note_end_timestamp(), Some(secs(4.0)));
    assert_eq!(track.notes_per_second(None, None), Ok(2.25));

    let events: Vec<_> = track
        .track_events()
        .iter()
        .map(|event| (event.timestamp, event.text.as_str()))
        .collect();
    assert_eq!(events, vec![(secs(2.0), "solo"), (secs(2.5), "soloend")]);

    let global = chart.global_events();
    let sections: Vec<_> = global.sections().map(GlobalEvent::value).collect();
    assert_eq!(sections, vec!["Intro", "Verse"]);
    let lyrics: Vec<_> = global.lyrics().map(GlobalEvent::value).collect();
    assert_eq!(lyrics, vec!["Hel-", "lo"]);
    assert_eq!(global.events().len(), 6);
}

#[test]
fn skipped_lines_are_warned() {
    let source = "[Song]
{
  Resolution = 192
}
[SyncTrack]
{
  0 = TS 4
  0 = B 120000
  0 = X 1
}
[EasySingle]
{
  0 = N 0 0
  0 = N 9 0
  96 = S 64 10
}
[EasySingle]
{
  0 = N 1 0
}
[Unknown]
{
}
";
    let ParseOutput {
        chart,
        lex_warnings,
        ..
    } = parse_chart(source, &ChartConfig::default()).unwrap();
    assert_eq!(
        lex_warnings,
        vec![
            LexWarning::UnknownEventCode {
                line: 9,
                code: "X".to_owned()
            },
            LexWarning::UnknownNoteIndex {
                line: 14,
                index: 9
            },
            LexWarning::UnknownPhraseKind { line: 15, kind: 64 },
            LexWarning::DuplicateSection {
                line: 17,
                name: "EasySingle".to_owned()
            },
            LexWarning::UnknownSection {
                line: 21,
                name: "Unknown".to_owned()
            },
        ]
    );
    let track = chart
        .track(TrackKey::new(Instrument::Single, Difficulty::Easy))
        .unwrap();
    assert_eq!(track.notes().len(), 1);
    assert_eq!(track.notes()[0].lane, Lane::Green);
}

#[test]
fn errors_are_layered() {
    assert_eq!(
        parse_chart("[Song]\n{\n  Resolution = 192\n", &ChartConfig::default()),
        Err(ParseError::Lex(LexError::UnclosedSection {
            line: 1,
            name: "Song".to_owned()
        }))
    );
    assert_eq!(
        parse_chart(
            "[Song]\n{\n  Resolution = 192\n}\n[SyncTrack]\n{\n  0 = B 120000\n}\n",
            &ChartConfig::default()
        ),
        Err(ParseError::Chart(ChartError::SyncTrack(
            BuildError::MissingInitialEvent {
                kind: SyncEventKind::TimeSignature
            }
        )))
    );
    assert!(
        parse_chart(
            "[Song]\n{\n  Resolution = 192\n}\n[SyncTrack]\n{\n  0 = B 120000\n}\n",
            &ChartConfig::new().initial_events(InitialEventPolicy::implied_default())
        )
        .is_ok()
    );
    assert_eq!(
        parse_chart(
            "[Song]\n{\n  Resolution = 192\n}\n[SyncTrack]\n{\n  0 = TS 4\n  0 = B 0\n}\n",
            &ChartConfig::default()
        ),
        Err(ParseError::Chart(ChartError::SyncTrack(
            BuildError::NonPositiveTempo { tick: 0, bpm: 0.0 }
        )))
    );
}
