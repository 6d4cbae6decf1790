//! CSV / TSV reader for labelled feature tables.
use std::collections::HashSet;
use std::path::Path;

use csv::StringRecord;

use crate::config::DataConfig;
use crate::data_handling::Dataset;
use crate::error::{LabelerError, Result};

/// Read a delimited table into a `Dataset`.
///
/// The delimiter is chosen from the extension (`.tsv`/`.tab` → tab, anything
/// else → comma). The label column is matched case-insensitively. Every failure
/// to produce a usable table is reported as `DataUnavailable`.
pub fn read_dataset<P: AsRef<Path>>(path: P, config: &DataConfig) -> Result<Dataset> {
    let path = path.as_ref();
    let unavailable = |msg: String| LabelerError::DataUnavailable(format!("{}: {}", path.display(), msg));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| unavailable(format!("failed to open: {}", e)))?;

    let headers = reader
        .headers()
        .map_err(|e| unavailable(format!("failed to read header row: {}", e)))?
        .clone();

    let label_idx = find_column(&headers, &config.label_column)
        .ok_or_else(|| unavailable(format!("missing label column '{}'", config.label_column)))?;

    let feature_indices = resolve_feature_indices(&headers, config, label_idx).map_err(unavailable)?;
    if feature_indices.is_empty() {
        return Err(unavailable("no feature columns detected in header".to_string()));
    }

    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| unavailable(format!("failed to read row {}: {}", row_idx + 1, e)))?;

        // skip blank trailing lines
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let label = record
            .get(label_idx)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| unavailable(format!("missing label value at row {}", row_idx + 1)))?;
        labels.push(label.to_string());

        let mut row = Vec::with_capacity(feature_indices.len());
        for &idx in &feature_indices {
            let value = record
                .get(idx)
                .ok_or_else(|| unavailable(format!("missing feature value at row {}", row_idx + 1)))?;
            let parsed = value.parse::<f64>().map_err(|_| {
                unavailable(format!(
                    "invalid feature '{}' at row {}: '{}'",
                    headers.get(idx).unwrap_or(""),
                    row_idx + 1,
                    value
                ))
            })?;
            if !parsed.is_finite() {
                return Err(unavailable(format!(
                    "non-finite feature '{}' at row {}: '{}'",
                    headers.get(idx).unwrap_or(""),
                    row_idx + 1,
                    value
                )));
            }
            row.push(parsed);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(unavailable("no data rows".to_string()));
    }

    let feature_names = feature_indices
        .iter()
        .map(|&idx| headers.get(idx).unwrap_or("").to_string())
        .collect();

    let dataset = Dataset::from_rows(&rows, &labels, feature_names)?;
    log::info!("Loaded {} rows from {}", dataset.n_samples(), path.display());
    Ok(dataset)
}

fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

fn resolve_feature_indices(
    headers: &StringRecord,
    config: &DataConfig,
    label_idx: usize,
) -> std::result::Result<Vec<usize>, String> {
    if let Some(names) = &config.feature_columns {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let idx = find_column(headers, name)
                .ok_or_else(|| format!("missing feature column '{}'", name))?;
            if idx == label_idx {
                return Err(format!("label column '{}' listed as a feature", name));
            }
            indices.push(idx);
        }
        let unique: HashSet<_> = indices.iter().collect();
        if unique.len() != indices.len() {
            return Err("duplicate feature columns".to_string());
        }
        return Ok(indices);
    }

    Ok((0..headers.len()).filter(|&idx| idx != label_idx).collect())
}
