use snafu::{Location, Snafu};
use tokio::task::JoinError;
use tokio_util::codec::LinesCodecError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Snafu, Debug)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to load settings"))]
    Config {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: config::ConfigError,
    },
    #[snafu(display("Invalid APP_ENVIRONMENT '{value}'"))]
    Environment {
        #[snafu(implicit)]
        location: Location,
        value: String,
    },
    #[snafu(display("Invalid playback settings"))]
    Playback {
        #[snafu(implicit)]
        location: Location,
        source: ais_playback::Error,
    },
    #[snafu(display("WebSocket transport failed"))]
    WebSocket {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: tokio_tungstenite::tungstenite::Error,
    },
    #[snafu(display("Failed to read live frame"))]
    Lines {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: LinesCodecError,
    },
    #[snafu(display("Live session task failed"))]
    Join {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: JoinError,
    },
}
