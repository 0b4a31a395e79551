use snafu::{Location, Snafu};
use std::{num::ParseFloatError, path::PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Snafu, Debug)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to open source '{}'", path.display()))]
    Io {
        #[snafu(implicit)]
        location: Location,
        path: PathBuf,
        #[snafu(source)]
        error: std::io::Error,
    },
    #[snafu(display("Failed to read csv headers of source '{source_name}'"))]
    Csv {
        #[snafu(implicit)]
        location: Location,
        source_name: String,
        #[snafu(source)]
        error: csv::Error,
    },
}

/// Reasons a single historical row is rejected during normalization.
#[derive(Snafu, Debug)]
#[snafu(module, visibility(pub))]
pub enum RecordError {
    #[snafu(display("Row is missing the '{field}' field"))]
    MissingField {
        #[snafu(implicit)]
        location: Location,
        field: &'static str,
    },
    #[snafu(display("Failed to parse '{value}' of field '{field}' as a float"))]
    ParseFloat {
        #[snafu(implicit)]
        location: Location,
        field: &'static str,
        value: String,
        #[snafu(source)]
        error: ParseFloatError,
    },
    #[snafu(display("Coordinate out of range, latitude: '{latitude}', longitude: '{longitude}'"))]
    InvalidCoordinate {
        #[snafu(implicit)]
        location: Location,
        latitude: f64,
        longitude: f64,
    },
    #[snafu(display("Failed to parse timestamp '{value}'"))]
    Timestamp {
        #[snafu(implicit)]
        location: Location,
        value: String,
    },
}
