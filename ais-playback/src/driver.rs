use ais_core::TimeSpan;
use snafu::OptionExt;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior},
};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{error, instrument, trace};

use crate::{
    PlaybackController, PlaybackState, Result, TickInterval, error::error::DriverClosedSnafu,
};

const COMMAND_BUFFER_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    Load(Option<TimeSpan>),
    Start,
    Pause,
    Resume,
    TogglePause,
    Stop,
    SetTickInterval(TickInterval),
}

/// Owns a [`PlaybackController`] on a background task and feeds it ticks at its current
/// tick interval.
///
/// The controller is only ever touched by that task. Dropping the handle, or calling
/// [`PlaybackHandle::shutdown`], cancels the task and its timer.
pub struct PlaybackHandle {
    commands: mpsc::Sender<PlaybackCommand>,
    state: watch::Receiver<PlaybackState>,
    cancellation: CancellationToken,
    task: JoinHandle<()>,
    _guard: DropGuard,
}

impl PlaybackHandle {
    pub fn spawn(controller: PlaybackController) -> PlaybackHandle {
        PlaybackHandle::spawn_with_cancellation(controller, CancellationToken::new())
    }

    /// Spawns the driver as a child of `parent`, cancelling `parent` tears it down too.
    pub fn spawn_with_cancellation(
        controller: PlaybackController,
        parent: CancellationToken,
    ) -> PlaybackHandle {
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let (state_sender, state) = watch::channel(controller.state());
        let cancellation = parent.child_token();

        let task = tokio::spawn(run(controller, receiver, state_sender, cancellation.clone()));

        PlaybackHandle {
            commands,
            state,
            _guard: cancellation.clone().drop_guard(),
            cancellation,
            task,
        }
    }

    pub async fn load(&self, span: Option<TimeSpan>) -> Result<()> {
        self.send(PlaybackCommand::Load(span)).await
    }

    pub async fn start(&self) -> Result<()> {
        self.send(PlaybackCommand::Start).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(PlaybackCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.send(PlaybackCommand::Resume).await
    }

    pub async fn toggle_pause(&self) -> Result<()> {
        self.send(PlaybackCommand::TogglePause).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(PlaybackCommand::Stop).await
    }

    /// Speed control entry point, the value is clamped to the range the control allows.
    pub async fn set_speed_ms(&self, millis: u64) -> Result<()> {
        self.set_tick_interval(TickInterval::from_ui_millis(millis))
            .await
    }

    pub async fn set_tick_interval(&self, tick_interval: TickInterval) -> Result<()> {
        self.send(PlaybackCommand::SetTickInterval(tick_interval))
            .await
    }

    pub fn state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    pub async fn shutdown(self) {
        self.cancellation.cancel();
        if let Err(e) = self.task.await {
            error!("playback driver panicked: {e:?}");
        }
    }

    async fn send(&self, command: PlaybackCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .ok()
            .context(DriverClosedSnafu)
    }
}

fn ticker(tick_interval: TickInterval) -> Interval {
    let period = tick_interval.as_duration();
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[instrument(skip_all)]
async fn run(
    mut controller: PlaybackController,
    mut commands: mpsc::Receiver<PlaybackCommand>,
    state: watch::Sender<PlaybackState>,
    cancellation: CancellationToken,
) {
    let mut interval = ticker(controller.tick_interval());

    loop {
        let ticking = controller.is_ticking();

        tokio::select! {
            _ = cancellation.cancelled() => break,
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                trace!("received playback command: {command:?}");

                let was_ticking = controller.is_ticking();
                let changed = match command {
                    PlaybackCommand::Load(span) => {
                        controller.load(span);
                        false
                    }
                    PlaybackCommand::Start => controller.start(),
                    PlaybackCommand::Pause => controller.pause(),
                    PlaybackCommand::Resume => controller.resume(),
                    PlaybackCommand::TogglePause => controller.toggle_pause(),
                    PlaybackCommand::Stop => controller.stop(),
                    PlaybackCommand::SetTickInterval(tick_interval) => {
                        controller.set_tick_interval(tick_interval);
                        true
                    }
                };

                // Entering `Running` or changing speed starts a fresh period.
                if controller.is_ticking() && (changed || !was_ticking) {
                    interval = ticker(controller.tick_interval());
                }
                state.send_replace(controller.state());
            }
            _ = interval.tick(), if ticking => {
                if controller.tick() {
                    state.send_replace(controller.state());
                }
            }
        }
    }

    trace!("playback driver stopped");
}
