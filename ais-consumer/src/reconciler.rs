use std::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
};

use ais_core::{AnomalyClassifier, BacklogEntry, ConnectionStatus, VesselId, VesselState};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::{
    models::{LiveMessage, LiveReport},
    overlay::{RenderEntity, anomaly_overlay},
};

/// Decides which of two reports for the same vessel is kept.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MergePolicy {
    /// The most recently received report always wins, regardless of its payload time.
    #[default]
    LastReceived,
    /// Reports older than the stored one are ignored. Reports without a timestamp are
    /// treated as new.
    LatestReported,
}

/// Outcome of applying one live message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Upserted(VesselId),
    Stale(VesselId),
    Unidentified,
    Opaque,
}

/// Folds the live message stream into the latest known state per vessel.
///
/// The reconciler is the single owner of the vessel map, every message is applied
/// completely before the next one is looked at.
pub struct Reconciler {
    vessels: BTreeMap<VesselId, VesselState>,
    backlog: VecDeque<BacklogEntry>,
    backlog_capacity: usize,
    status: ConnectionStatus,
    merge_policy: MergePolicy,
    classifier: Arc<dyn AnomalyClassifier>,
}

/// Immutable view of the reconciler handed to readers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveSnapshot {
    pub status: ConnectionStatus,
    /// Ordered by vessel id.
    pub vessels: Vec<VesselState>,
    /// Oldest event first.
    pub backlog: Vec<BacklogEntry>,
}

impl LiveSnapshot {
    pub fn overlay(&self, show_anomalies: bool) -> Vec<RenderEntity> {
        anomaly_overlay(&self.vessels, show_anomalies)
    }
}

impl Reconciler {
    pub fn new(
        backlog_capacity: usize,
        merge_policy: MergePolicy,
        classifier: Arc<dyn AnomalyClassifier>,
    ) -> Reconciler {
        Reconciler {
            vessels: BTreeMap::new(),
            backlog: VecDeque::with_capacity(backlog_capacity),
            backlog_capacity,
            status: ConnectionStatus::default(),
            merge_policy,
            classifier,
        }
    }

    pub fn apply_frame(&mut self, frame: &str) -> Applied {
        self.apply(LiveMessage::parse(frame))
    }

    #[instrument(skip_all)]
    pub fn apply(&mut self, message: LiveMessage) -> Applied {
        match message {
            LiveMessage::Opaque(text) => {
                info!("live stream: {text}");
                self.push_backlog(BacklogEntry::Text(text));
                Applied::Opaque
            }
            LiveMessage::Unidentified(raw) => {
                debug!("ignoring json frame without a vessel identifier");
                self.push_backlog(BacklogEntry::Json(raw));
                Applied::Unidentified
            }
            LiveMessage::Report { report, raw } => {
                self.push_backlog(BacklogEntry::Json(raw.clone()));
                self.upsert(*report, raw)
            }
        }
    }

    fn upsert(&mut self, report: LiveReport, raw: serde_json::Value) -> Applied {
        let id = report.mmsi.clone();

        if self.merge_policy == MergePolicy::LatestReported {
            let stored = self.vessels.get(&id).and_then(|v| v.reported_at);
            if let (Some(stored), Some(received)) = (stored, report.reported_at) {
                if received < stored {
                    debug!(vessel = %id, %stored, %received, "ignoring stale report");
                    return Applied::Stale(id);
                }
            }
        }

        let attributes = report.attributes();
        let classification = self.classifier.classify(&attributes);
        let state = VesselState {
            id: id.clone(),
            position: report.position(),
            reported_at: report.reported_at,
            attributes,
            classification,
            raw,
        };

        self.vessels.insert(id.clone(), state);
        Applied::Upserted(id)
    }

    fn push_backlog(&mut self, entry: BacklogEntry) {
        if self.backlog_capacity == 0 {
            return;
        }
        while self.backlog.len() >= self.backlog_capacity {
            self.backlog.pop_front();
        }
        self.backlog.push_back(entry);
    }

    /// Returns whether the status changed.
    pub fn set_status(&mut self, status: ConnectionStatus) -> bool {
        if self.status == status {
            return false;
        }
        info!(from = %self.status, to = %status, "connection status changed");
        self.status = status;
        true
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn get(&self, id: &VesselId) -> Option<&VesselState> {
        self.vessels.get(id)
    }

    pub fn vessels(&self) -> impl Iterator<Item = &VesselState> {
        self.vessels.values()
    }

    pub fn backlog(&self) -> impl Iterator<Item = &BacklogEntry> {
        self.backlog.iter()
    }

    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            status: self.status,
            vessels: self.vessels.values().cloned().collect(),
            backlog: self.backlog.iter().cloned().collect(),
        }
    }
}
