use std::{collections::HashMap, fs::File, io::Read, path::Path};

use snafu::ResultExt;
use tracing::{instrument, warn};

use crate::{
    RawRecord, Result,
    error::error::{CsvSnafu, IoSnafu},
};

/// The raw rows of one historical source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalSource {
    pub name: String,
    pub records: Vec<RawRecord>,
}

impl HistoricalSource {
    /// Reads a headed csv document, rows that fail to parse are skipped.
    pub fn from_reader(name: impl Into<String>, reader: impl Read) -> Result<HistoricalSource> {
        let name = name.into();

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        csv_reader.headers().with_context(|_| CsvSnafu {
            source_name: name.clone(),
        })?;

        let mut records = Vec::new();
        for (i, row) in csv_reader.deserialize::<HashMap<String, String>>().enumerate() {
            match row {
                Ok(fields) => records.push(RawRecord::new(fields)),
                Err(e) => warn!("skipping unreadable row {i} of source '{name}': {e}"),
            }
        }

        Ok(HistoricalSource { name, records })
    }

    #[instrument]
    pub fn open(path: &Path) -> Result<HistoricalSource> {
        let file = File::open(path).context(IoSnafu { path })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        HistoricalSource::from_reader(name, file)
    }
}
