//! JSON row files.
//!
//! A stand-in for the spreadsheet export: either one JSON array of rows, or
//! JSON Lines (one row per line) when the file ends in `.jsonl`. A file that
//! is not valid JSON fails as a whole; individual bad cells do not (see the
//! lenient row deserializers in `tally_core::types`).

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tally_core::error::SourceError;
use tally_core::traits::RowSource;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonRowSource<R> {
    path: PathBuf,
    _row: PhantomData<fn() -> R>,
}

impl<R> JsonRowSource<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _row: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json_lines(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "jsonl")
    }
}

impl<R: DeserializeOwned> RowSource for JsonRowSource<R> {
    type Row = R;

    fn fetch_rows(&self) -> Result<Vec<R>, SourceError> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| SourceError::Io(format!("{}: {e}", self.path.display())))?;

        let rows = if self.is_json_lines() {
            text.lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| {
                    serde_json::from_str(line)
                        .map_err(|e| SourceError::Malformed(format!("line {}: {e}", i + 1)))
                })
                .collect::<Result<Vec<R>, _>>()?
        } else {
            serde_json::from_str::<Vec<R>>(&text).map_err(|e| SourceError::Malformed(e.to_string()))?
        };

        debug!(path = %self.path.display(), rows = rows.len(), "source: rows loaded");
        Ok(rows)
    }
}
