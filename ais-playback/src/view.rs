use ais_core::{PositionSample, Track, TrackSet};

/// The samples of `track` revealed at `progress`.
///
/// A sample is revealed once its position within the track's own span, as a percentage, is
/// at most `progress`. Tracks covering less than the combined span therefore finish their
/// reveal before the timeline completes.
///
/// A track whose samples all share one timestamp has an empty span and is fully visible
/// from progress 0.
pub fn visible_prefix(track: &Track, progress: f64) -> &[PositionSample] {
    let span = track.span();
    let samples = track.samples();
    let visible = samples.partition_point(|s| span.percent_of(s.timestamp) <= progress);
    &samples[..visible]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackView<'a> {
    pub track: &'a Track,
    pub visible: &'a [PositionSample],
}

pub fn visible_tracks(tracks: &TrackSet, progress: u8) -> Vec<TrackView<'_>> {
    tracks
        .tracks()
        .iter()
        .map(|track| TrackView {
            track,
            visible: visible_prefix(track, progress as f64),
        })
        .collect()
}
