use std::time::Duration;

use snafu::ResultExt;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{Span, instrument, trace};

use crate::{
    error::{Result, error::JoinSnafu},
    reconciler::{Applied, LiveSnapshot, Reconciler},
    transport::{AisTransport, TransportEvent},
};

/// Drives a [`Reconciler`] from a transport and publishes snapshots of it.
///
/// Frames are applied one at a time in arrival order. Snapshots are published at once on
/// every connection status change, otherwise at most once per commit interval and only if
/// a frame arrived since the last one.
pub struct Consumer {
    commit_interval: Duration,
}

impl Consumer {
    pub fn new(commit_interval: Duration) -> Consumer {
        Consumer { commit_interval }
    }

    #[instrument(skip_all, fields(app.num_frames, app.num_upserts))]
    pub async fn run(
        self,
        mut transport: impl AisTransport,
        mut reconciler: Reconciler,
        state: watch::Sender<LiveSnapshot>,
        cancellation: CancellationToken,
    ) -> Reconciler {
        let mut interval = tokio::time::interval(self.commit_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut dirty = false;
        let mut num_frames = 0;
        let mut num_upserts = 0;

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    trace!("live session cancelled");
                    break;
                }
                event = transport.next_event() => match event {
                    Some(TransportEvent::Status(status)) => {
                        if reconciler.set_status(status) {
                            state.send_replace(reconciler.snapshot());
                            dirty = false;
                        }
                    }
                    Some(TransportEvent::Frame(frame)) => {
                        num_frames += 1;
                        if let Applied::Upserted(_) = reconciler.apply_frame(&frame) {
                            num_upserts += 1;
                        }
                        dirty = true;
                    }
                    None => {
                        if dirty {
                            state.send_replace(reconciler.snapshot());
                        }
                        trace!("live transport exhausted");
                        break;
                    }
                },
                _ = interval.tick(), if dirty => {
                    state.send_replace(reconciler.snapshot());
                    dirty = false;
                }
            }
        }

        let span = Span::current();
        span.record("app.num_frames", num_frames);
        span.record("app.num_upserts", num_upserts);

        reconciler
    }
}

/// Handle to a live session running on a background task.
///
/// Dropping the handle, or calling [`LiveSession::shutdown`], cancels the session and
/// detaches it from its transport.
pub struct LiveSession {
    state: watch::Receiver<LiveSnapshot>,
    cancellation: CancellationToken,
    task: JoinHandle<Reconciler>,
    _guard: DropGuard,
}

impl LiveSession {
    /// Spawns the session as a child of `parent`.
    pub fn spawn<T>(
        consumer: Consumer,
        transport: T,
        reconciler: Reconciler,
        parent: CancellationToken,
    ) -> LiveSession
    where
        T: AisTransport + 'static,
    {
        let (sender, state) = watch::channel(reconciler.snapshot());
        let cancellation = parent.child_token();

        let task = tokio::spawn(consumer.run(transport, reconciler, sender, cancellation.clone()));

        LiveSession {
            state,
            _guard: cancellation.clone().drop_guard(),
            cancellation,
            task,
        }
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveSnapshot> {
        self.state.clone()
    }

    /// Stops the session and hands back the reconciler as it was at teardown.
    pub async fn shutdown(self) -> Result<Reconciler> {
        self.cancellation.cancel();
        self.task.await.context(JoinSnafu)
    }

    /// Waits for the transport to be exhausted.
    pub async fn join(self) -> Result<Reconciler> {
        self.task.await.context(JoinSnafu)
    }
}
