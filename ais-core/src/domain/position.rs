use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{VesselId, VesselTypeLabel};

/// Naive formats seen in historical AIS exports, all interpreted as UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` if either value is non-finite or outside of its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Option<Coordinates> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        valid.then_some(Coordinates {
            latitude,
            longitude,
        })
    }

    pub fn planar_distance(&self, latitude: f64, longitude: f64) -> f64 {
        (self.latitude - latitude).hypot(self.longitude - longitude)
    }
}

/// One AIS observation from a historical source.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
    pub mmsi: Option<VesselId>,
    /// Passed through uninterpreted.
    pub course_over_ground: Option<String>,
    /// Passed through uninterpreted.
    pub speed_over_ground: Option<String>,
    pub vessel_name: String,
    pub vessel_type: VesselTypeLabel,
}

impl PositionSample {
    pub fn speed_knots(&self) -> Option<f64> {
        self.speed_over_ground
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
    }
}

/// An inclusive time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSpan {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<TimeSpan> {
        (start <= end).then_some(TimeSpan { start, end })
    }

    pub fn covering(a: DateTime<Utc>, b: DateTime<Utc>) -> TimeSpan {
        TimeSpan {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The smallest span covering both `self` and `other`.
    pub fn union(&self, other: &TimeSpan) -> TimeSpan {
        TimeSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Maps a 0-100 percentage linearly onto the span.
    pub fn at_percent(&self, percent: f64) -> DateTime<Utc> {
        let percent = percent.clamp(0.0, 100.0);
        let offset = (self.duration().num_milliseconds() as f64 * percent / 100.0).round();
        self.start + Duration::milliseconds(offset as i64)
    }

    /// Where `timestamp` falls within the span as a 0-100 percentage.
    ///
    /// A span without duration places every timestamp at 0.
    pub fn percent_of(&self, timestamp: DateTime<Utc>) -> f64 {
        let total = self.duration().num_milliseconds();
        if total == 0 {
            return 0.0;
        }
        (timestamp - self.start).num_milliseconds() as f64 * 100.0 / total as f64
    }
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|ts| ts.and_utc())
}

#[cfg(any(test, feature = "test"))]
mod test {
    use super::*;

    impl PositionSample {
        pub fn test_new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> PositionSample {
            PositionSample {
                coordinates: Coordinates {
                    latitude,
                    longitude,
                },
                timestamp,
                mmsi: None,
                course_over_ground: Some("123.3".into()),
                speed_over_ground: Some("8.4".into()),
                vessel_name: "VOYAGER".into(),
                vessel_type: VesselTypeLabel::from(31),
            }
        }
    }
}
