#![deny(warnings)]
#![deny(rust_2018_idioms)]

//! Time proportional playback of historical tracks.

mod controller;
mod driver;
mod error;
mod view;

pub use controller::*;
pub use driver::*;
pub use error::{Error, Result};
pub use view::*;
