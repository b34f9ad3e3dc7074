//! Error types for trip data loading.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with a city's data file. All of them end the session.
#[derive(Error, Debug)]
pub enum DataError {
    /// None of the candidate files for a city exist
    #[error("no data file for {city} in {}", .dir.display())]
    NoDataFile { city: String, dir: PathBuf },

    /// Extension not handled by any loader
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// A required column is absent from the header
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// Start/End Time cell did not match any accepted layout.
    /// `row` counts data rows from 0, header excluded.
    #[error("data row {row}: cannot parse timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },

    /// Numeric cell could not be parsed
    #[error("data row {row}: '{value}' in column '{column}' is not a number")]
    BadNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}
