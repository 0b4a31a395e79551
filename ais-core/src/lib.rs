#![deny(warnings)]
#![deny(rust_2018_idioms)]

//! Domain types shared by the playback and live stream crates, together with the
//! normalization of historical AIS records into ordered per-vessel tracks.

mod domain;
mod error;
mod normalize;
mod ports;
mod source;
mod track;

pub use domain::*;
pub use error::{Error, RecordError, Result};
pub use normalize::*;
pub use ports::*;
pub use source::*;
pub use track::*;
