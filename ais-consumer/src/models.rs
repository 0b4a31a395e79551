use ais_core::{
    Coordinates, VesselAttributes, VesselId, VesselTypeLabel, parse_timestamp,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

/// Alternative spellings of report fields, mapped to the name [`LiveReport`] reads.
const FIELD_ALIASES: [(&str, &str); 15] = [
    ("mmsi", "MMSI"),
    ("latitude", "Latitude"),
    ("LAT", "Latitude"),
    ("longitude", "Longitude"),
    ("LON", "Longitude"),
    ("speedOverGround", "SOG"),
    ("maxSpeed", "MaxSOG"),
    ("headingVariance", "HeadingVariance"),
    ("minProximity", "MinProximity"),
    ("shipType", "VesselType"),
    ("VesselName", "ShipName"),
    ("name", "ShipName"),
    ("IsAnomalous", "isAnomalous"),
    ("msgtime", "BaseDateTime"),
    ("Timestamp", "BaseDateTime"),
];

/// Position report received from the live feed.
///
/// Two payload shapes are seen in practice, flat reports carrying `Latitude`/`Longitude`
/// and server aggregates nesting the last position and anomaly flag under
/// `aggregated_data`. Only the identifier is required, an optional field with a value that
/// cannot be understood is read as absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiveReport {
    #[serde(rename = "MMSI")]
    pub mmsi: VesselId,
    #[serde(rename = "Latitude", default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude", default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(rename = "SOG", default, deserialize_with = "lenient_f64")]
    pub speed_over_ground: Option<f64>,
    #[serde(rename = "MaxSOG", default, deserialize_with = "lenient_f64")]
    pub max_speed: Option<f64>,
    #[serde(rename = "HeadingVariance", default, deserialize_with = "lenient_f64")]
    pub heading_variance: Option<f64>,
    #[serde(rename = "MinProximity", default, deserialize_with = "lenient_f64")]
    pub min_proximity: Option<f64>,
    #[serde(rename = "VesselType", default, deserialize_with = "lenient_vessel_type")]
    pub vessel_type: Option<VesselTypeLabel>,
    #[serde(rename = "ShipName", default, deserialize_with = "lenient_string")]
    pub vessel_name: Option<String>,
    #[serde(rename = "isAnomalous", default, deserialize_with = "lenient_flag")]
    pub is_anomalous: Option<bool>,
    #[serde(rename = "BaseDateTime", default, deserialize_with = "lenient_timestamp")]
    pub reported_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_aggregated")]
    pub aggregated_data: Option<AggregatedData>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AggregatedData {
    #[serde(rename = "LastLAT", default, deserialize_with = "lenient_f64")]
    pub last_latitude: Option<f64>,
    #[serde(rename = "LastLON", default, deserialize_with = "lenient_f64")]
    pub last_longitude: Option<f64>,
    #[serde(rename = "MaxSOG", default, deserialize_with = "lenient_f64")]
    pub max_speed: Option<f64>,
    #[serde(rename = "HeadingVariance", default, deserialize_with = "lenient_f64")]
    pub heading_variance: Option<f64>,
    #[serde(rename = "isAnomalous", default, deserialize_with = "lenient_flag")]
    pub is_anomalous: Option<bool>,
}

impl LiveReport {
    /// Flat coordinates win over aggregated ones, invalid coordinates yield `None`.
    pub fn position(&self) -> Option<Coordinates> {
        let aggregated = self.aggregated_data.as_ref();
        let latitude = self
            .latitude
            .or_else(|| aggregated.and_then(|a| a.last_latitude))?;
        let longitude = self
            .longitude
            .or_else(|| aggregated.and_then(|a| a.last_longitude))?;
        Coordinates::new(latitude, longitude)
    }

    pub fn attributes(&self) -> VesselAttributes {
        let aggregated = self.aggregated_data.as_ref();
        VesselAttributes {
            vessel_name: self.vessel_name.clone(),
            vessel_type: self.vessel_type.clone(),
            speed_over_ground: self.speed_over_ground,
            max_speed: self
                .max_speed
                .or_else(|| aggregated.and_then(|a| a.max_speed)),
            heading_variance: self
                .heading_variance
                .or_else(|| aggregated.and_then(|a| a.heading_variance)),
            min_proximity: self.min_proximity,
            reported_anomaly: self
                .is_anomalous
                .or_else(|| aggregated.and_then(|a| a.is_anomalous)),
        }
    }
}

/// A live frame, classified once when it is received.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveMessage {
    /// JSON carrying a vessel identifier.
    Report { report: Box<LiveReport>, raw: Value },
    /// JSON that is not a vessel report.
    Unidentified(Value),
    /// Anything that is not JSON, such as connection banners.
    Opaque(String),
}

impl LiveMessage {
    pub fn parse(frame: &str) -> LiveMessage {
        let raw: Value = match serde_json::from_str(frame) {
            Ok(v) => v,
            Err(_) => return LiveMessage::Opaque(frame.to_string()),
        };

        let Some(object) = raw.as_object() else {
            return LiveMessage::Unidentified(raw);
        };

        match LiveReport::deserialize(Value::Object(canonicalize(object))) {
            Ok(report) => LiveMessage::Report {
                report: Box::new(report),
                raw,
            },
            Err(e) => {
                debug!("json frame is not a vessel report: {e}");
                LiveMessage::Unidentified(raw)
            }
        }
    }
}

fn canonical_key(key: &str) -> Option<&'static str> {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
}

/// Renames aliased fields, a field already present under its canonical name wins.
fn canonicalize(object: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(object.len());
    for (key, value) in object {
        match canonical_key(key) {
            Some(canonical) => {
                out.entry(canonical).or_insert_with(|| value.clone());
            }
            None => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    out
}

fn number(value: Value) -> Option<f64> {
    let number: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn flag(value: Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Strings are parsed as timestamps, numbers as unix seconds or, when too large for that,
/// unix milliseconds.
fn timestamp(value: Value) -> Option<DateTime<Utc>> {
    const MAX_UNIX_SECONDS: i64 = 100_000_000_000;

    match value {
        Value::String(s) => parse_timestamp(&s),
        Value::Number(n) => {
            let v = n.as_i64()?;
            if v.abs() < MAX_UNIX_SECONDS {
                DateTime::from_timestamp(v, 0)
            } else {
                DateTime::from_timestamp_millis(v)
            }
        }
        _ => None,
    }
}

fn vessel_type(value: Value) -> Option<VesselTypeLabel> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(match n.as_i64().and_then(|v| i32::try_from(v).ok()) {
            Some(code) => VesselTypeLabel::from(code),
            None => VesselTypeLabel::Raw(n.to_string()),
        }),
        Value::String(s) => Some(VesselTypeLabel::resolve(&s)),
        v => Some(VesselTypeLabel::Raw(v.to_string())),
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer).ok().and_then(number))
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(Value::deserialize(deserializer).ok().and_then(flag))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(Value::deserialize(deserializer).ok().and_then(timestamp))
}

fn lenient_vessel_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<VesselTypeLabel>, D::Error> {
    Ok(Value::deserialize(deserializer).ok().and_then(vessel_type))
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Value::deserialize(deserializer).ok().and_then(text))
}

fn lenient_aggregated<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AggregatedData>, D::Error> {
    Ok(Value::deserialize(deserializer)
        .ok()
        .and_then(|v| AggregatedData::deserialize(v).ok()))
}
