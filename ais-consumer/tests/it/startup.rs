use std::{io::Write, path::PathBuf, time::Duration};

use ais_consumer::{settings::Settings, startup::App};
use ais_core::{Grouping, TimeSpan};
use ais_playback::Phase;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

const HEADER: &str = "MMSI,BaseDateTime,LAT,LON,SOG,COG,VesselName,VesselType";

fn write_source(dir: &TempDir, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    path
}

fn collision_sources(dir: &TempDir) -> Vec<PathBuf> {
    vec![
        write_source(
            dir,
            "voyager.csv",
            &[
                "367000001,2019-05-10T10:00:00,29.50,-94.80,8.4,123.3,VOYAGER,31",
                "367000001,2019-05-10T10:05:00,29.55,-94.85,8.1,120.0,VOYAGER,31",
                "367000001,2019-05-10T10:10:00,29.60,-94.90,7.9,118.5,VOYAGER,31",
            ],
        ),
        dir.path().join("missing.csv"),
        write_source(
            dir,
            "genesis_river.csv",
            &[
                "367000002,2019-05-10T10:15:00,29.64,-94.96,5.0,300.1,GENESIS RIVER,1025",
                "367000002,2019-05-10T10:05:00,29.70,-94.95,5.2,301.0,GENESIS RIVER,1025",
                "367000002,not a time,29.69,-94.95,5.2,301.0,GENESIS RIVER,1025",
            ],
        ),
    ]
}

#[tokio::test]
async fn test_sources_load_in_order_and_skip_unreadable_ones() {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::test_default();
    settings.playback.sources = collision_sources(&dir);

    let app = App::build(settings).await;
    let tracks = app.tracks().tracks();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].name(), "voyager");
    assert_eq!(tracks[0].color(), "blue");
    assert_eq!(tracks[1].name(), "genesis_river");
    // The unreadable source still takes its palette slot.
    assert_eq!(tracks[1].color(), "blue");
    assert_eq!(tracks[1].samples().len(), 2);

    assert_eq!(
        app.tracks().span(),
        TimeSpan::new(
            Utc.with_ymd_and_hms(2019, 5, 10, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2019, 5, 10, 10, 15, 0).unwrap(),
        )
    );
}

#[tokio::test]
async fn test_by_vessel_grouping_splits_sources() {
    let dir = TempDir::new().unwrap();
    let mixed = write_source(
        &dir,
        "mixed.csv",
        &[
            "1,2019-05-10T10:00:00,29.50,-94.80,8.4,123.3,A,70",
            "2,2019-05-10T10:01:00,29.51,-94.81,8.4,123.3,B,80",
            "1,2019-05-10T10:02:00,29.52,-94.82,8.4,123.3,A,70",
        ],
    );

    let mut settings = Settings::test_default();
    settings.playback.grouping = Grouping::ByVessel;
    settings.playback.sources = vec![mixed];

    let app = App::build(settings).await;

    let tracks = app.tracks().tracks();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].samples().len(), 2);
    assert_eq!(tracks[1].samples().len(), 1);
}

#[tokio::test]
async fn test_playback_autostarts_over_loaded_tracks() {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::test_default();
    settings.playback.sources = collision_sources(&dir);
    settings.playback.autostart = true;
    settings.playback.tick_interval = Duration::from_millis(50);

    let app = App::build(settings).await;
    let handle = app.playback().await.unwrap();

    let mut state = handle.subscribe();
    let running = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| s.phase == Phase::Running && s.progress > 0),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    assert!(running.running);
    assert!(running.current_time.is_some());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_playback_without_sources_stays_idle() {
    let mut settings = Settings::test_default();
    settings.playback.autostart = true;

    let app = App::build(settings).await;
    let handle = app.playback().await.unwrap();

    handle.start().await.unwrap();
    // Commands are handled in order, so once the speed change shows up both starts have been
    // handled too.
    handle.set_speed_ms(200).await.unwrap();

    let mut state = handle.subscribe();
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| s.speed_millis_per_tick == 200),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    assert_eq!(state.phase, Phase::Idle);
    assert!(!state.running);
    assert_eq!(state.progress, 0);
    assert!(app.tracks().is_empty());

    handle.shutdown().await;
}
