use crate::{Classification, VesselAttributes};

/// Decides whether a vessel behaves anomalously.
///
/// Called on every accepted live update, implementations must be cheap and free of side
/// effects.
pub trait AnomalyClassifier: Send + Sync {
    fn classify(&self, attributes: &VesselAttributes) -> Classification;
}

impl<F> AnomalyClassifier for F
where
    F: Fn(&VesselAttributes) -> Classification + Send + Sync,
{
    fn classify(&self, attributes: &VesselAttributes) -> Classification {
        self(attributes)
    }
}
