use std::path::Path;

use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{HistoricalSource, PositionSample, TimeSpan, normalize};

/// How the samples of a single source are split into tracks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Grouping {
    /// One track per source.
    #[default]
    BySource,
    /// One track per MMSI within a source.
    ByVessel,
}

/// Display colors handed out to tracks in load order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<String>);

impl Palette {
    pub fn new(colors: Vec<String>) -> Palette {
        if colors.is_empty() {
            Palette::default()
        } else {
            Palette(colors)
        }
    }

    pub fn color(&self, index: usize) -> &str {
        match self.0.get(index % self.0.len().max(1)) {
            Some(c) => c.as_str(),
            None => "blue",
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette(vec!["blue".into(), "red".into()])
    }
}

/// A time ordered sequence of samples from one source, never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    name: String,
    color: String,
    samples: Vec<PositionSample>,
}

impl Track {
    /// Sorts `samples` by timestamp, keeping input order between equal timestamps.
    /// Returns `None` if there are no samples.
    pub fn build(
        name: impl Into<String>,
        color: impl Into<String>,
        mut samples: Vec<PositionSample>,
    ) -> Option<Track> {
        if samples.is_empty() {
            return None;
        }

        samples.sort_by_key(|s| s.timestamp);

        Some(Track {
            name: name.into(),
            color: color.into(),
            samples,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn samples(&self) -> &[PositionSample] {
        &self.samples
    }

    pub fn span(&self) -> TimeSpan {
        let start = self.samples[0].timestamp;
        let end = self.samples[self.samples.len() - 1].timestamp;
        TimeSpan::covering(start, end)
    }

    /// The sample closest to the given point, used for hover lookups.
    pub fn nearest_sample(&self, latitude: f64, longitude: f64) -> &PositionSample {
        self.samples
            .iter()
            .min_by(|a, b| {
                a.coordinates
                    .planar_distance(latitude, longitude)
                    .total_cmp(&b.coordinates.planar_distance(latitude, longitude))
            })
            .unwrap_or(&self.samples[0])
    }
}

/// Display attributes of a single sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub timestamp: String,
    pub course: String,
    pub speed: String,
    pub vessel_name: String,
    pub vessel_type: String,
}

impl From<&PositionSample> for Tooltip {
    fn from(s: &PositionSample) -> Self {
        Tooltip {
            timestamp: s.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            course: format!("{}°", s.course_over_ground.as_deref().unwrap_or_default()),
            speed: format!("{} knots", s.speed_over_ground.as_deref().unwrap_or_default()),
            vessel_name: s.vessel_name.clone(),
            vessel_type: s.vessel_type.to_string(),
        }
    }
}

/// All tracks of a playback session together with their combined time span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSet {
    tracks: Vec<Track>,
    span: Option<TimeSpan>,
    /// Palette slots handed out so far. Every source takes at least one, also when it is
    /// unreadable or yields no tracks, so colors stay stable across loads.
    color_slots: usize,
}

impl TrackSet {
    pub fn new() -> TrackSet {
        TrackSet::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Earliest start and latest end over all tracks, `None` when there are no tracks.
    pub fn span(&self) -> Option<TimeSpan> {
        self.span
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn push(&mut self, track: Track) {
        let span = track.span();
        self.span = Some(match self.span {
            Some(current) => current.union(&span),
            None => span,
        });
        self.tracks.push(track);
    }

    /// Normalizes and adds one source, returning the number of tracks it contributed.
    #[instrument(skip_all, fields(app.source = %source.name))]
    pub fn add_source(
        &mut self,
        source: &HistoricalSource,
        grouping: Grouping,
        palette: &Palette,
    ) -> usize {
        let first_slot = self.color_slots;
        let samples = normalize(&source.records);

        let tracks = match grouping {
            Grouping::BySource => {
                self.color_slots += 1;
                Track::build(&source.name, palette.color(first_slot), samples)
                    .into_iter()
                    .collect::<Vec<_>>()
            }
            Grouping::ByVessel => {
                let groups = samples
                    .into_iter()
                    .sorted_by(|a, b| a.mmsi.cmp(&b.mmsi))
                    .chunk_by(|s| s.mmsi.clone())
                    .into_iter()
                    .map(|(mmsi, group)| (mmsi, group.collect::<Vec<_>>()))
                    .collect::<Vec<_>>();
                self.color_slots += groups.len().max(1);

                groups
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, (mmsi, samples))| {
                        let name = match mmsi {
                            Some(mmsi) => format!("{} ({mmsi})", source.name),
                            None => source.name.clone(),
                        };
                        Track::build(name, palette.color(first_slot + i), samples)
                    })
                    .collect()
            }
        };

        let num_tracks = tracks.len();
        if num_tracks == 0 {
            warn!("source contributed no tracks");
        } else {
            debug!("source contributed {num_tracks} tracks");
        }

        for track in tracks {
            self.push(track);
        }

        num_tracks
    }

    /// Loads every source from disk, a source that cannot be read contributes no tracks.
    pub fn load_sources<P: AsRef<Path>>(
        paths: &[P],
        grouping: Grouping,
        palette: &Palette,
    ) -> TrackSet {
        let mut set = TrackSet::new();
        for path in paths {
            let path = path.as_ref();
            match HistoricalSource::open(path) {
                Ok(source) => {
                    set.add_source(&source, grouping, palette);
                }
                Err(e) => {
                    set.color_slots += 1;
                    warn!("failed to load source '{}': {e}", path.display());
                }
            }
        }
        set
    }

    /// Adds sources that were read elsewhere, `None` entries stand for unreadable sources
    /// and still consume a palette slot.
    pub fn from_sources<I>(sources: I, grouping: Grouping, palette: &Palette) -> TrackSet
    where
        I: IntoIterator<Item = Option<HistoricalSource>>,
    {
        let mut set = TrackSet::new();
        for source in sources {
            match source {
                Some(source) => {
                    set.add_source(&source, grouping, palette);
                }
                None => set.color_slots += 1,
            }
        }
        set
    }
}
