use ais_core::{PositionSample, Track, TrackSet};
use ais_playback::{PlaybackController, PlaybackHandle, TickInterval};
use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

pub fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 5, 10, h, m, s).unwrap()
}

/// Two sources, 10:00-10:10 with three samples and 10:05-10:15 with two.
pub fn collision_tracks() -> TrackSet {
    let mut set = TrackSet::new();
    set.push(
        Track::build(
            "voyager",
            "blue",
            vec![
                PositionSample::test_new(29.50, -94.80, at(10, 0, 0)),
                PositionSample::test_new(29.55, -94.85, at(10, 5, 0)),
                PositionSample::test_new(29.60, -94.90, at(10, 10, 0)),
            ],
        )
        .unwrap(),
    );
    set.push(
        Track::build(
            "genesis_river",
            "red",
            vec![
                PositionSample::test_new(29.70, -94.95, at(10, 5, 0)),
                PositionSample::test_new(29.64, -94.96, at(10, 15, 0)),
            ],
        )
        .unwrap(),
    );
    set
}

pub fn spawn(tracks: &TrackSet, millis: u64) -> PlaybackHandle {
    let mut controller = PlaybackController::new(TickInterval::from_millis(millis).unwrap());
    controller.load_tracks(tracks);
    PlaybackHandle::spawn(controller)
}

pub async fn advance(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
