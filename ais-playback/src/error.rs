use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Snafu, Debug)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Tick interval must be positive"))]
    ZeroTickInterval {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Playback driver is no longer running"))]
    DriverClosed {
        #[snafu(implicit)]
        location: Location,
    },
}
