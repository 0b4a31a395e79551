use ais_core::{AnomalyClassifier, Classification, VesselAttributes};
use serde::Deserialize;

/// Classifies vessels by fixed limits on their aggregated attributes.
///
/// A vessel is anomalous if the payload already says so, or if any configured limit is
/// violated. Limits left unset are not checked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThresholdClassifier {
    #[serde(default)]
    pub knots_limit: Option<f64>,
    #[serde(default)]
    pub heading_variance_limit: Option<f64>,
    /// Vessels closer than this many nautical miles to another vessel are anomalous.
    #[serde(default)]
    pub min_proximity_nm: Option<f64>,
}

impl ThresholdClassifier {
    fn exceeds_speed(&self, attributes: &VesselAttributes) -> bool {
        let Some(limit) = self.knots_limit else {
            return false;
        };
        attributes
            .max_speed
            .or(attributes.speed_over_ground)
            .is_some_and(|speed| speed > limit)
    }

    fn exceeds_heading_variance(&self, attributes: &VesselAttributes) -> bool {
        match (self.heading_variance_limit, attributes.heading_variance) {
            (Some(limit), Some(variance)) => variance > limit,
            _ => false,
        }
    }

    fn too_close(&self, attributes: &VesselAttributes) -> bool {
        match (self.min_proximity_nm, attributes.min_proximity) {
            (Some(limit), Some(proximity)) => proximity < limit,
            _ => false,
        }
    }
}

impl AnomalyClassifier for ThresholdClassifier {
    fn classify(&self, attributes: &VesselAttributes) -> Classification {
        let anomalous = attributes.reported_anomaly.unwrap_or(false)
            || self.exceeds_speed(attributes)
            || self.exceeds_heading_variance(attributes)
            || self.too_close(attributes);

        Classification::from_flag(anomalous)
    }
}
