//! Writing the aggregate to disk.
//!
//! Every flush rewrites the full file set from the aggregate, so calling it
//! after each region or page leaves a consistent checkpoint behind. The first
//! flush of a sink also removes the JSON and CSV files an earlier run left in
//! the directory, so the region files on disk always partition the aggregate.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use branchscout_core::{Aggregator, BranchRecord};

pub(crate) const ALL_JSON: &str = "branches_all.json";
pub(crate) const ALL_CSV: &str = "branches_all.csv";
pub(crate) const CSV_HEADER: [&str; 6] = ["name", "phone", "status", "ratingOrCount", "pageUrl", "region"];

#[derive(Debug, Error)]
pub(crate) enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Where and what a flush wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FlushReport {
    pub records: usize,
    pub all_json: PathBuf,
    pub region_files: Vec<PathBuf>,
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub(crate) struct OutputSink {
    dir: PathBuf,
    write_csv: bool,
    cleared: bool,
}

impl OutputSink {
    pub(crate) fn new(dir: impl Into<PathBuf>, write_csv: bool) -> Self {
        Self {
            dir: dir.into(),
            write_csv,
            cleared: false,
        }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the aggregate JSON, one JSON file per region group, and the CSV if enabled.
    pub(crate) fn flush(&mut self, aggregator: &Aggregator) -> Result<FlushReport, SinkError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))?;
        if !self.cleared {
            self.clear_previous()?;
            self.cleared = true;
        }

        let all_json = self.dir.join(ALL_JSON);
        write_json(&all_json, aggregator.records())?;

        let mut region_files = Vec::new();
        for group in aggregator.partition_by_region() {
            let path = self
                .dir
                .join(format!("{}.json", sanitize_file_name(group.region)));
            write_json(&path, &group.records)?;
            region_files.push(path);
        }

        let csv = if self.write_csv {
            let path = self.dir.join(ALL_CSV);
            write_csv(&path, aggregator.records())?;
            Some(path)
        } else {
            None
        };

        tracing::debug!(
            dir = %self.dir.display(),
            records = aggregator.len(),
            region_files = region_files.len(),
            "output flushed"
        );
        Ok(FlushReport {
            records: aggregator.len(),
            all_json,
            region_files,
            csv,
        })
    }

    fn clear_previous(&self) -> Result<(), SinkError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| io_error(&self.dir, source))?;
        let mut removed = 0usize;
        for entry in entries {
            let path = entry.map_err(|source| io_error(&self.dir, source))?.path();
            if is_output_file(&path) {
                std::fs::remove_file(&path).map_err(|source| io_error(&path, source))?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(
                dir = %self.dir.display(),
                removed,
                "removed output files from a previous run"
            );
        }
        Ok(())
    }
}

fn is_output_file(path: &Path) -> bool {
    path.is_file()
        && (path.extension().is_some_and(|ext| ext == "json")
            || path.file_name().is_some_and(|name| name == ALL_CSV))
}

/// Replace characters that are reserved in Windows or POSIX file names with `_`.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SinkError> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    std::fs::write(path, body).map_err(|source| io_error(path, source))
}

fn write_csv(path: &Path, records: &[BranchRecord]) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            cell(record.name.as_ref()),
            cell(record.phone.as_ref()),
            cell(record.status.as_ref()),
            cell(record.rating_or_count.as_ref()),
            cell(record.page_url.as_ref()),
            cell(record.region.as_ref()),
        ])?;
    }
    writer.flush().map_err(|source| io_error(path, source))
}

fn cell(value: Option<&String>) -> &str {
    value.map_or("", String::as_str)
}

fn io_error(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
