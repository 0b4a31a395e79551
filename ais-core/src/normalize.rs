use std::collections::HashMap;

use snafu::{OptionExt, ResultExt};
use tracing::{debug, instrument, warn};

use crate::{
    Coordinates, PositionSample, VesselId, VesselTypeLabel, parse_timestamp,
    error::record_error::{InvalidCoordinateSnafu, MissingFieldSnafu, ParseFloatSnafu, TimestampSnafu},
    RecordError,
};

pub const LATITUDE_FIELD: &str = "LAT";
pub const LONGITUDE_FIELD: &str = "LON";
pub const TIMESTAMP_FIELD: &str = "BaseDateTime";
pub const COURSE_FIELD: &str = "COG";
pub const SPEED_FIELD: &str = "SOG";
pub const VESSEL_NAME_FIELD: &str = "VesselName";
pub const VESSEL_TYPE_FIELD: &str = "VesselType";
pub const MMSI_FIELD: &str = "MMSI";

/// One row of a historical source, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord(HashMap<String, String>);

impl RawRecord {
    pub fn new(fields: HashMap<String, String>) -> RawRecord {
        RawRecord(fields)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|v| v.as_str())
    }

    fn required(&self, field: &'static str) -> Result<&str, RecordError> {
        self.get(field).context(MissingFieldSnafu { field })
    }

    fn float(&self, field: &'static str) -> Result<f64, RecordError> {
        let value = self.required(field)?;
        value
            .trim()
            .parse::<f64>()
            .with_context(|_| ParseFloatSnafu { field, value })
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        RawRecord(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl TryFrom<&RawRecord> for PositionSample {
    type Error = RecordError;

    fn try_from(record: &RawRecord) -> Result<Self, Self::Error> {
        let latitude = record.float(LATITUDE_FIELD)?;
        let longitude = record.float(LONGITUDE_FIELD)?;
        let coordinates = Coordinates::new(latitude, longitude).context(
            InvalidCoordinateSnafu {
                latitude,
                longitude,
            },
        )?;

        let timestamp = record.required(TIMESTAMP_FIELD)?;
        let timestamp =
            parse_timestamp(timestamp).context(TimestampSnafu { value: timestamp })?;

        Ok(PositionSample {
            coordinates,
            timestamp,
            mmsi: record.get(MMSI_FIELD).and_then(VesselId::new),
            course_over_ground: record.get(COURSE_FIELD).map(String::from),
            speed_over_ground: record.get(SPEED_FIELD).map(String::from),
            vessel_name: record.get(VESSEL_NAME_FIELD).unwrap_or_default().to_string(),
            vessel_type: VesselTypeLabel::resolve(record.get(VESSEL_TYPE_FIELD).unwrap_or_default()),
        })
    }
}

/// Converts raw rows into validated samples, dropping every row that fails validation.
///
/// The output keeps input order, ordering by time is done when a track is built.
#[instrument(skip(records), fields(app.num_records, app.num_dropped))]
pub fn normalize<'a, I>(records: I) -> Vec<PositionSample>
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut num_records = 0;
    let mut num_dropped = 0;

    let samples = records
        .into_iter()
        .filter_map(|record| {
            num_records += 1;
            match PositionSample::try_from(record) {
                Ok(sample) => Some(sample),
                Err(e) => {
                    num_dropped += 1;
                    debug!("dropping record: {e}");
                    None
                }
            }
        })
        .collect::<Vec<_>>();

    if num_dropped > 0 {
        warn!("dropped {num_dropped} of {num_records} records during normalization");
    }

    let span = tracing::Span::current();
    span.record("app.num_records", num_records);
    span.record("app.num_dropped", num_dropped);

    samples
}
