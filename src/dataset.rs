//! Training dataset discovery and parsing.

use crate::encoder::RawRecord;
use crate::error::DataError;
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Default locations checked for the dataset, relative to the working directory.
pub const DEFAULT_CANDIDATE_PATHS: [&str; 4] = [
    "Mall_Customers.csv",
    "../Mall_Customers.csv",
    "../../Mall_Customers.csv",
    "data/Mall_Customers.csv",
];

/// One CSV row as stored on disk.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "CustomerID")]
    #[allow(dead_code)]
    customer_id: Option<String>,
    #[serde(rename = "Genre", alias = "Gender")]
    genre: String,
    #[serde(rename = "Age")]
    age: f64,
    #[serde(rename = "Annual Income (k$)")]
    annual_income: f64,
    #[serde(rename = "Spending Score (1-100)")]
    spending_score: f64,
}

impl From<CsvRow> for RawRecord {
    fn from(row: CsvRow) -> Self {
        RawRecord {
            age: row.age,
            annual_income: row.annual_income,
            spending_score: row.spending_score,
            genre: row.genre,
        }
    }
}

/// First candidate that exists as a file.
pub fn locate<P: AsRef<Path>>(candidates: &[P]) -> Result<PathBuf, DataError> {
    for candidate in candidates {
        let path = candidate.as_ref();
        debug!("Probing dataset candidate {}", path.display());
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
    }
    Err(DataError::NotFound {
        tried: candidates
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect(),
    })
}

/// Parse every row of the dataset at `path`, in file order.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>, DataError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let file = File::open(path).map_err(|source| DataError::Io {
        path: display.clone(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let records = reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(RawRecord::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| DataError::Csv {
            path: display.clone(),
            source,
        })?;

    if records.is_empty() {
        return Err(DataError::Empty { path: display });
    }
    Ok(records)
}

/// Locate the dataset among `candidates` and parse it.
pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<(PathBuf, Vec<RawRecord>), DataError> {
    let path = locate(candidates)?;
    let records = load_records(&path)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok((path, records))
}
