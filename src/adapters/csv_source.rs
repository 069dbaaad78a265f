use crate::core::{Record, Storage};
use crate::utils::error::{CardError, Result};
use std::collections::BTreeMap;

/// Parses CSV bytes with a header row into one record per data row.
/// Short rows simply lack the trailing fields.
pub fn parse_records(data: &[u8], delimiter: u8) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let data: BTreeMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        records.push(Record::new(data));
    }
    Ok(records)
}

/// Reads the question file. Any failure is reported and turned into an
/// empty record set; a missing file is told apart from other errors.
pub async fn read_records<S: Storage>(storage: &S, path: &str, delimiter: u8) -> Vec<Record> {
    tracing::info!("📄 Loading questions from '{}'", path);

    let data = match storage.read_file(path).await {
        Ok(data) => data,
        Err(CardError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("❌ Question file not found: '{}'", path);
            return Vec::new();
        }
        Err(e) => {
            tracing::error!("❌ Unexpected error reading '{}': {}", path, e);
            return Vec::new();
        }
    };

    match parse_records(&data, delimiter) {
        Ok(records) => {
            tracing::info!("✅ Loaded {} question row(s)", records.len());
            records
        }
        Err(e) => {
            tracing::error!("❌ Could not parse '{}': {}", path, e);
            Vec::new()
        }
    }
}
