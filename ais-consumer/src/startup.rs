use std::{path::PathBuf, sync::Arc};

use ais_core::{HistoricalSource, TrackSet};
use ais_playback::{PlaybackController, PlaybackHandle, TickInterval, visible_tracks};
use snafu::ResultExt;
use tokio::{io::AsyncRead, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::{
    consumer::{Consumer, LiveSession},
    error::{Result, error::PlaybackSnafu},
    overlay::MarkerClass,
    reconciler::Reconciler,
    settings::Settings,
    transport::{AisTransport, LinesTransport},
    websocket::WebSocketTransport,
};

pub struct App {
    settings: Settings,
    tracks: TrackSet,
    cancellation: CancellationToken,
}

impl App {
    pub async fn build(settings: Settings) -> App {
        let tracks = load_tracks(&settings).await;
        info!(
            "loaded {} tracks from {} sources",
            tracks.len(),
            settings.playback.sources.len()
        );

        App {
            settings,
            tracks,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn tracks(&self) -> &TrackSet {
        &self.tracks
    }

    pub fn reconciler(&self) -> Reconciler {
        let stream = &self.settings.stream;
        Reconciler::new(
            stream.backlog_capacity,
            stream.merge_policy,
            Arc::new(self.settings.classifier.clone()),
        )
    }

    /// Spawns the playback driver over the loaded tracks, starting it if configured to.
    pub async fn playback(&self) -> Result<PlaybackHandle> {
        let tick_interval =
            TickInterval::try_from(self.settings.playback.tick_interval).context(PlaybackSnafu)?;

        let mut controller = PlaybackController::new(tick_interval);
        controller.load_tracks(&self.tracks);

        let handle = PlaybackHandle::spawn_with_cancellation(controller, self.cancellation.clone());
        if self.settings.playback.autostart {
            handle.start().await.context(PlaybackSnafu)?;
        }
        Ok(handle)
    }

    pub fn live_session<T>(&self, transport: T) -> LiveSession
    where
        T: AisTransport + 'static,
    {
        LiveSession::spawn(
            Consumer::new(self.settings.commit_interval),
            transport,
            self.reconciler(),
            self.cancellation.clone(),
        )
    }

    /// Runs playback and the live session until ctrl-c is received.
    pub async fn run(self) -> Result<()> {
        let playback = self.playback().await?;
        let live = match &self.settings.stream.url {
            Some(url) => self.live_session(WebSocketTransport::new(url.as_str())),
            None => {
                info!("no stream url configured, reading live frames from stdin");
                self.live_session(LinesTransport::new(
                    tokio::io::stdin(),
                    self.settings.stream.max_frame_length,
                ))
            }
        };

        let mut playback_state = playback.subscribe();
        let mut live_state = live.subscribe();
        let mut live_open = true;

        loop {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        error!("failed to listen for ctrl-c: {e:?}");
                    }
                    break;
                }
                res = playback_state.changed() => {
                    if res.is_err() {
                        warn!("playback driver exited unexpectedly");
                        break;
                    }
                    let state = playback_state.borrow_and_update().clone();
                    let visible: usize = visible_tracks(&self.tracks, state.progress)
                        .iter()
                        .map(|v| v.visible.len())
                        .sum();
                    info!(
                        phase = ?state.phase,
                        progress = state.progress,
                        current_time = ?state.current_time,
                        "playback: {visible} samples visible",
                    );
                }
                res = live_state.changed(), if live_open => {
                    if res.is_err() {
                        live_open = false;
                        continue;
                    }
                    let snapshot = live_state.borrow_and_update().clone();
                    let overlay = snapshot.overlay(self.settings.show_anomalies);
                    let anomalous = overlay
                        .iter()
                        .filter(|e| e.class == MarkerClass::Anomalous)
                        .count();
                    info!(
                        status = %snapshot.status,
                        "live: {} vessels, {} markers, {anomalous} anomalous",
                        snapshot.vessels.len(),
                        overlay.len(),
                    );
                }
            }
        }

        self.cancellation.cancel();
        playback.shutdown().await;
        let reconciler = live.shutdown().await?;
        info!("stopped with {} live vessels", reconciler.len());

        Ok(())
    }

    /// Starts a live session reading newline delimited frames from `source`.
    pub fn run_test(&self, source: impl AsyncRead + Unpin + Send + 'static) -> LiveSession {
        self.live_session(LinesTransport::new(
            source,
            self.settings.stream.max_frame_length,
        ))
    }
}

/// Reads all sources concurrently, keeping their configured order.
#[instrument(skip_all, fields(app.num_sources = settings.playback.sources.len()))]
async fn load_tracks(settings: &Settings) -> TrackSet {
    let paths = &settings.playback.sources;
    let mut set = JoinSet::new();

    for (i, path) in paths.iter().cloned().enumerate() {
        set.spawn_blocking(move || (i, open_source(path)));
    }

    let mut sources: Vec<Option<HistoricalSource>> = (0..paths.len()).map(|_| None).collect();
    while let Some(res) = set.join_next().await {
        match res {
            Ok((i, source)) => sources[i] = source,
            Err(e) => error!("source loading task failed: {e:?}"),
        }
    }

    TrackSet::from_sources(
        sources,
        settings.playback.grouping,
        &settings.playback.palette,
    )
}

fn open_source(path: PathBuf) -> Option<HistoricalSource> {
    match HistoricalSource::open(&path) {
        Ok(source) => Some(source),
        Err(e) => {
            warn!("failed to load source '{}': {e}", path.display());
            None
        }
    }
}
