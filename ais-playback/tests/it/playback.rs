use ais_core::TrackSet;
use ais_playback::{Phase, PlaybackController, PlaybackHandle, TickInterval, visible_tracks};
use tokio_util::sync::CancellationToken;

use crate::helper::{advance, at, collision_tracks, spawn};

#[tokio::test(start_paused = true)]
async fn test_progress_advances_once_per_tick() {
    let tracks = collision_tracks();
    let handle = spawn(&tracks, 100);

    handle.start().await.unwrap();
    advance(2050).await;

    let state = handle.state();
    assert_eq!(state.phase, Phase::Running);
    assert_eq!(state.progress, 20);
    assert_eq!(state.current_time, Some(at(10, 3, 0)));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_global_span_midpoint_time() {
    let tracks = collision_tracks();
    let handle = spawn(&tracks, 50);

    handle.start().await.unwrap();
    advance(2525).await;

    let state = handle.state();
    assert_eq!(state.progress, 50);
    assert_eq!(state.current_time, Some(at(10, 7, 30)));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_speed_change_applies_to_future_ticks_only() {
    let tracks = collision_tracks();
    let handle = spawn(&tracks, 100);

    handle.start().await.unwrap();
    advance(2050).await;
    assert_eq!(handle.state().progress, 20);

    handle
        .set_tick_interval(TickInterval::from_millis(1000).unwrap())
        .await
        .unwrap();

    advance(500).await;
    assert_eq!(handle.state().progress, 20);
    assert_eq!(handle.state().speed_millis_per_tick, 1000);

    advance(550).await;
    assert_eq!(handle.state().progress, 21);

    advance(1000).await;
    assert_eq!(handle.state().progress, 22);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_speed_control_is_clamped() {
    let tracks = collision_tracks();
    let handle = spawn(&tracks, 100);

    handle.set_speed_ms(1000).await.unwrap();
    advance(1).await;
    assert_eq!(handle.state().speed_millis_per_tick, 500);

    handle.set_speed_ms(1).await.unwrap();
    advance(1).await;
    assert_eq!(handle.state().speed_millis_per_tick, 50);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_and_resume_continues() {
    let tracks = collision_tracks();
    let handle = spawn(&tracks, 100);

    handle.start().await.unwrap();
    advance(550).await;
    assert_eq!(handle.state().progress, 5);

    handle.toggle_pause().await.unwrap();
    advance(1000).await;
    let state = handle.state();
    assert_eq!(state.progress, 5);
    assert!(state.paused);
    assert!(state.running);

    handle.toggle_pause().await.unwrap();
    advance(150).await;
    let state = handle.state();
    assert_eq!(state.progress, 6);
    assert!(!state.paused);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_playback_completes_and_stops_ticking() {
    let tracks = collision_tracks();
    let handle = spawn(&tracks, 50);
    let mut updates = handle.subscribe();

    handle.start().await.unwrap();
    advance(5010).await;

    let state = handle.state();
    assert_eq!(state.phase, Phase::Completed);
    assert_eq!(state.progress, 100);
    assert!(!state.running);
    assert_eq!(state.current_time, Some(at(10, 15, 0)));

    updates.mark_unchanged();
    advance(1000).await;
    assert!(!updates.has_changed().unwrap());

    let views = visible_tracks(&tracks, state.progress);
    assert_eq!(views[0].visible.len(), 3);
    assert_eq!(views[1].visible.len(), 2);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_without_tracks_does_nothing() {
    let handle = spawn(&TrackSet::new(), 100);

    handle.start().await.unwrap();
    advance(1000).await;

    let state = handle.state();
    assert_eq!(state.phase, Phase::Idle);
    assert_eq!(state.progress, 0);
    assert_eq!(state.current_time, None);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_tears_down_driver() {
    let tracks = collision_tracks();
    let parent = CancellationToken::new();
    let mut controller = PlaybackController::default();
    controller.load_tracks(&tracks);

    let handle = PlaybackHandle::spawn_with_cancellation(controller, parent.clone());
    handle.start().await.unwrap();
    advance(350).await;
    assert_eq!(handle.state().progress, 3);

    parent.cancel();
    advance(1).await;

    assert!(handle.start().await.is_err());
    advance(1000).await;
    assert_eq!(handle.state().progress, 3);
}

#[tokio::test(start_paused = true)]
async fn test_reloading_resets_session() {
    let tracks = collision_tracks();
    let handle = spawn(&tracks, 100);

    handle.start().await.unwrap();
    advance(350).await;

    handle.load(None).await.unwrap();
    advance(1).await;
    assert_eq!(handle.state().phase, Phase::Idle);
    assert_eq!(handle.state().progress, 0);

    handle.start().await.unwrap();
    advance(500).await;
    assert_eq!(handle.state().progress, 0);

    handle.shutdown().await;
}
