use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Coordinates, VesselId, VesselTypeLabel};

/// Connection state of a live session as reported by the transport.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    #[strum(serialize = "Connected")]
    Open,
    Closing,
    Closed,
    Unknown,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum Classification {
    #[default]
    Normal,
    Anomalous,
}

impl Classification {
    pub fn from_flag(anomalous: bool) -> Classification {
        if anomalous {
            Classification::Anomalous
        } else {
            Classification::Normal
        }
    }

    pub fn is_anomalous(&self) -> bool {
        matches!(self, Classification::Anomalous)
    }
}

/// Aggregated attributes of a vessel handed to the anomaly classifier.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VesselAttributes {
    pub vessel_name: Option<String>,
    pub vessel_type: Option<VesselTypeLabel>,
    pub speed_over_ground: Option<f64>,
    pub max_speed: Option<f64>,
    pub heading_variance: Option<f64>,
    /// Distance in nautical miles to the closest other vessel.
    pub min_proximity: Option<f64>,
    /// Classification already made upstream and carried in the payload.
    pub reported_anomaly: Option<bool>,
}

/// Latest known state of one vessel in the live view.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselState {
    pub id: VesselId,
    pub position: Option<Coordinates>,
    pub reported_at: Option<DateTime<Utc>>,
    pub attributes: VesselAttributes,
    pub classification: Classification,
    /// The payload this state was built from.
    pub raw: serde_json::Value,
}

/// A raw live event kept for diagnostic display.
#[derive(Debug, Clone, PartialEq)]
pub enum BacklogEntry {
    Json(serde_json::Value),
    Text(String),
}

impl Display for BacklogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BacklogEntry::Json(v) => v.fmt(f),
            BacklogEntry::Text(t) => f.write_str(t),
        }
    }
}
