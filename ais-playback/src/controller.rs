use std::time::Duration;

use ais_core::{TimeSpan, TrackSet};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{Result, error::error::ZeroTickIntervalSnafu};

pub const MAX_PROGRESS: u8 = 100;

/// Wall clock time between two playback ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TickInterval(u64);

impl TickInterval {
    /// Bounds accepted from the speed control.
    pub const MIN_UI_MILLIS: u64 = 50;
    pub const MAX_UI_MILLIS: u64 = 500;

    pub fn from_millis(millis: u64) -> Result<TickInterval> {
        if millis == 0 {
            ZeroTickIntervalSnafu.fail()
        } else {
            Ok(TickInterval(millis))
        }
    }

    /// Clamps a value coming from the speed control into its allowed range.
    pub fn from_ui_millis(millis: u64) -> TickInterval {
        TickInterval(millis.clamp(Self::MIN_UI_MILLIS, Self::MAX_UI_MILLIS))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for TickInterval {
    fn default() -> Self {
        TickInterval(100)
    }
}

impl TryFrom<Duration> for TickInterval {
    type Error = crate::Error;

    fn try_from(value: Duration) -> std::result::Result<Self, Self::Error> {
        TickInterval::from_millis(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// Read only view of the controller handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub phase: Phase,
    pub progress: u8,
    pub running: bool,
    pub paused: bool,
    pub speed_millis_per_tick: u64,
    pub current_time: Option<DateTime<Utc>>,
}

/// Playback timeline state machine.
///
/// `Idle -> Running -> (Paused <-> Running) -> Completed`. Progress advances by one percent
/// per tick and is mapped linearly onto the combined span of the loaded tracks. The
/// controller does not own a timer, ticks are delivered by the caller.
#[derive(Debug, Clone, Default)]
pub struct PlaybackController {
    phase: Phase,
    progress: u8,
    tick_interval: TickInterval,
    span: Option<TimeSpan>,
    current_time: Option<DateTime<Utc>>,
}

impl PlaybackController {
    pub fn new(tick_interval: TickInterval) -> PlaybackController {
        PlaybackController {
            tick_interval,
            ..Default::default()
        }
    }

    /// Replaces the session with a new set of tracks, `None` means no tracks are loaded.
    pub fn load(&mut self, span: Option<TimeSpan>) {
        debug!("loading playback span: {span:?}");
        self.span = span;
        self.phase = Phase::Idle;
        self.progress = 0;
        self.current_time = None;
    }

    pub fn load_tracks(&mut self, tracks: &TrackSet) {
        self.load(tracks.span());
    }

    /// Restarts playback from zero. Does nothing when no tracks are loaded.
    pub fn start(&mut self) -> bool {
        let Some(span) = self.span else {
            debug!("ignoring start without loaded tracks");
            return false;
        };

        self.phase = Phase::Running;
        self.progress = 0;
        self.current_time = Some(span.start());
        debug!("playback started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
            debug!(progress = self.progress, "playback paused");
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self) -> bool {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
            debug!(progress = self.progress, "playback resumed");
            true
        } else {
            false
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle | Phase::Completed => false,
        }
    }

    /// Returns to `Idle`, keeping the progress made so far.
    pub fn stop(&mut self) -> bool {
        match self.phase {
            Phase::Running | Phase::Paused => {
                self.phase = Phase::Idle;
                debug!(progress = self.progress, "playback stopped");
                true
            }
            Phase::Idle | Phase::Completed => false,
        }
    }

    /// Advances progress by one step, returns false if not running.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }

        self.progress = (self.progress + 1).min(MAX_PROGRESS);
        self.current_time = self.span.map(|s| s.at_percent(self.progress as f64));

        if self.progress == MAX_PROGRESS {
            self.phase = Phase::Completed;
            debug!("playback completed");
        }
        true
    }

    /// Applies to future ticks only, progress is left untouched.
    pub fn set_tick_interval(&mut self, tick_interval: TickInterval) {
        self.tick_interval = tick_interval;
    }

    pub fn tick_interval(&self) -> TickInterval {
        self.tick_interval
    }

    pub fn is_ticking(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn span(&self) -> Option<TimeSpan> {
        self.span
    }

    pub fn current_time(&self) -> Option<DateTime<Utc>> {
        self.current_time
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            phase: self.phase,
            progress: self.progress,
            running: matches!(self.phase, Phase::Running | Phase::Paused),
            paused: self.phase == Phase::Paused,
            speed_millis_per_tick: self.tick_interval.as_millis(),
            current_time: self.current_time,
        }
    }
}
