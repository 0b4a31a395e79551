use ais_core::{Coordinates, VesselId, VesselState};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum MarkerClass {
    Normal,
    Anomalous,
}

/// Attributes shown when a marker is selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub mmsi: String,
    pub last_lat: f64,
    pub last_lon: f64,
    /// `"Yes"` or `"No"`.
    pub is_anomalous: &'static str,
}

/// A positioned vessel ready to be drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEntity {
    pub id: VesselId,
    pub position: Coordinates,
    pub class: MarkerClass,
    pub popup: Popup,
}

/// Projects vessel states into map markers.
///
/// Vessels without a known position are left out. With `show_anomalies` disabled every
/// marker is drawn as normal, the popup still carries the classification.
pub fn anomaly_overlay<'a, I>(vessels: I, show_anomalies: bool) -> Vec<RenderEntity>
where
    I: IntoIterator<Item = &'a VesselState>,
{
    vessels
        .into_iter()
        .filter_map(|vessel| {
            let position = vessel.position?;
            let anomalous = vessel.classification.is_anomalous();

            let class = if show_anomalies && anomalous {
                MarkerClass::Anomalous
            } else {
                MarkerClass::Normal
            };

            Some(RenderEntity {
                id: vessel.id.clone(),
                position,
                class,
                popup: Popup {
                    mmsi: vessel.id.to_string(),
                    last_lat: position.latitude,
                    last_lon: position.longitude,
                    is_anomalous: if anomalous { "Yes" } else { "No" },
                },
            })
        })
        .collect()
}
