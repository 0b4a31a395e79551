#![deny(warnings)]
#![deny(rust_2018_idioms)]

//! Consumes a live AIS stream into a deduplicated per-vessel view with an anomaly overlay,
//! alongside playback of historical tracks.

pub mod classifier;
pub mod consumer;
pub mod error;
pub mod models;
pub mod overlay;
pub mod reconciler;
pub mod settings;
pub mod startup;
pub mod transport;
pub mod websocket;

pub use classifier::ThresholdClassifier;
pub use reconciler::{LiveSnapshot, MergePolicy, Reconciler};
