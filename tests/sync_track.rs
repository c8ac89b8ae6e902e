use chart_rs::prelude::*;
use itertools::Itertools;
use pretty_assertions::assert_eq;

fn tempo(tick: i64, bpm: f64) -> RawTempo {
    RawTempo { tick, bpm }
}

fn time_signature(tick: i64, numerator: u32, denominator: u32) -> RawTimeSignature {
    RawTimeSignature {
        tick,
        numerator,
        denominator,
    }
}

fn sync_track(resolution: u32, tempos: Vec<RawTempo>) -> Result<SyncTrack, BuildError> {
    SyncTrack::new(
        Resolution::new(resolution)?,
        tempos,
        [time_signature(0, 4, 4)],
        &ChartConfig::default(),
    )
}

fn seconds(track: &SyncTrack, tick: u64) -> f64 {
    track.timestamp_at_tick(Tick(tick)).as_f64()
}

#[test]
fn tempo_doubling() {
    let track = sync_track(192, vec![tempo(0, 120.0), tempo(384, 240.0)]).unwrap();
    assert_eq!(seconds(&track, 0), 0.0);
    assert_eq!(seconds(&track, 192), 0.5);
    assert_eq!(seconds(&track, 384), 1.0);
    assert_eq!(seconds(&track, 576), 1.25);
}

#[test]
fn whole_beats_at_constant_tempo() {
    for bpm in [60.0, 120.0, 150.0, 97.5, 333.0] {
        for resolution in [192, 480, 1000] {
            let track = sync_track(resolution, vec![tempo(0, bpm)]).unwrap();
            for k in 0..500u64 {
                assert_eq!(
                    seconds(&track, k * u64::from(resolution)),
                    k as f64 * 60.0 / bpm,
                    "k = {k}, bpm = {bpm}, resolution = {resolution}"
                );
            }
        }
    }
}

#[test]
fn non_decreasing() {
    let track = sync_track(
        192,
        vec![
            tempo(0, 87.3),
            tempo(100, 300.0),
            tempo(101, 12.5),
            tempo(777, 180.0),
            tempo(2000, 0.001),
            tempo(2001, 999.9),
        ],
    )
    .unwrap();
    let timestamps: Vec<_> = (0..3000).map(|tick| track.timestamp_at_tick(Tick(tick))).collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(timestamps[0], Seconds::ZERO);
}

#[test]
fn non_decreasing_past_representable_time() {
    let slow = sync_track(192, vec![tempo(0, 1e-300)]).unwrap();
    let near = slow.timestamp_at_tick(Tick(192));
    let far = slow.timestamp_at_tick(Tick(192_000_000_000));
    assert!(near.as_f64().is_finite());
    assert!(near <= far);
    assert_eq!(far, Seconds::MAX);

    let anchored = sync_track(
        192,
        vec![tempo(0, 1e-300), tempo(192_000_000_000, 120.0)],
    )
    .unwrap();
    assert_eq!(anchored.tempo_events()[1].timestamp, Seconds::MAX);
    let ticks = [0, 192, 191_999_999_999, 192_000_000_000, 192_000_000_192];
    let timestamps: Vec<_> = ticks
        .into_iter()
        .map(|tick| anchored.timestamp_at_tick(Tick(tick)))
        .collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(timestamps[4], Seconds::MAX);
}

#[test]
fn query_matches_anchor_exactly() {
    let track = sync_track(
        480,
        vec![
            tempo(0, 133.7),
            tempo(1234, 71.1),
            tempo(5555, 240.2),
            tempo(9999, 59.94),
        ],
    )
    .unwrap();
    for event in track.tempo_events() {
        assert_eq!(track.timestamp_at_tick(event.tick), event.timestamp);
    }
}

#[test]
fn declaration_order_breaks_ties() {
    let track = sync_track(
        192,
        vec![tempo(192, 60.0), tempo(0, 120.0), tempo(192, 240.0)],
    )
    .unwrap();
    let bpms: Vec<_> = track
        .tempo_events()
        .iter()
        .map(|event| (event.tick, event.bpm.as_f64()))
        .collect();
    assert_eq!(bpms, vec![(Tick(0), 120.0), (Tick(192), 240.0)]);
    assert_eq!(seconds(&track, 384), 0.75);
}

#[test]
fn input_order_does_not_matter_for_distinct_ticks() {
    let tempos = [tempo(0, 120.0), tempo(300, 90.0), tempo(700, 200.0), tempo(900, 60.0)];
    let expected = sync_track(192, tempos.to_vec()).unwrap();
    for permutation in tempos.into_iter().permutations(tempos.len()) {
        assert_eq!(sync_track(192, permutation).unwrap(), expected);
    }
}

#[test]
fn missing_initial_tempo() {
    assert_eq!(
        sync_track(192, vec![tempo(10, 120.0)]),
        Err(BuildError::MissingInitialEvent {
            kind: SyncEventKind::Tempo
        })
    );
    assert_eq!(
        sync_track(192, vec![]),
        Err(BuildError::MissingInitialEvent {
            kind: SyncEventKind::Tempo
        })
    );
}

#[test]
fn missing_initial_time_signature() {
    assert_eq!(
        SyncTrack::new(
            Resolution::STANDARD,
            [tempo(0, 120.0)],
            [time_signature(768, 3, 4)],
            &ChartConfig::default(),
        ),
        Err(BuildError::MissingInitialEvent {
            kind: SyncEventKind::TimeSignature
        })
    );
}

#[test]
fn implied_initial_events() {
    let config = ChartConfig::new().initial_events(InitialEventPolicy::implied_default());
    let track = SyncTrack::new(
        Resolution::STANDARD,
        [tempo(384, 60.0)],
        [time_signature(768, 3, 4)],
        &config,
    )
    .unwrap();
    assert_eq!(track.bpm_at(Tick(0)), Bpm::DEFAULT);
    assert_eq!(track.bpm_at(Tick(384)), Bpm::new(60.0).unwrap());
    assert_eq!(track.time_signature_at(Tick(0)), TimeSignature::COMMON);
    assert_eq!(
        track.time_signature_at(Tick(768)),
        TimeSignature::new(3, 4).unwrap()
    );
    assert_eq!(seconds(&track, 384), 1.0);
    assert_eq!(seconds(&track, 576), 2.0);
}

#[test]
fn invalid_input() {
    assert_eq!(
        sync_track(192, vec![tempo(-1, 120.0)]),
        Err(BuildError::InvalidTick { tick: -1 })
    );
    assert_eq!(
        sync_track(192, vec![tempo(0, -120.0)]),
        Err(BuildError::NonPositiveTempo {
            tick: 0,
            bpm: -120.0
        })
    );
    assert_eq!(
        sync_track(0, vec![tempo(0, 120.0)]),
        Err(BuildError::InvalidResolution { resolution: 0 })
    );
    assert_eq!(
        SyncTrack::new(
            Resolution::STANDARD,
            [tempo(0, 120.0)],
            [time_signature(0, 4, 4), time_signature(192, 7, 6)],
            &ChartConfig::default(),
        ),
        Err(BuildError::InvalidTimeSignature {
            tick: 192,
            numerator: 7,
            denominator: 6
        })
    );
}

#[test]
fn negative_query() {
    let track = sync_track(192, vec![tempo(0, 120.0)]).unwrap();
    assert_eq!(
        track.timestamp_at(-192),
        Err(BuildError::InvalidTick { tick: -192 })
    );
    assert_eq!(track.timestamp_at(192).map(Seconds::as_f64), Ok(0.5));
}

#[test]
fn duration_straddles_tempo_change() {
    let track = sync_track(192, vec![tempo(0, 120.0), tempo(384, 240.0)]).unwrap();
    assert_eq!(
        track.duration_between(Tick(192), 384).map(Seconds::as_f64),
        Ok(0.75)
    );
    assert!(track.duration_between(Tick(u64::MAX), 1).is_err());
}

#[test]
fn reverse_lookup() {
    let track = sync_track(192, vec![tempo(0, 120.0), tempo(384, 240.0)]).unwrap();
    assert_eq!(track.tick_position_at(Seconds::new(1.125).unwrap()), 480.0);
    assert_eq!(track.tick_at_timestamp(Seconds::new(1.0).unwrap()), Tick(384));
    assert_eq!(track.tick_at_timestamp(Seconds::new(0.25).unwrap()), Tick(96));
    for tick in (0..2000).step_by(7) {
        let timestamp = track.timestamp_at_tick(Tick(tick));
        assert_eq!(track.tick_at_timestamp(timestamp), Tick(tick));
    }
}
