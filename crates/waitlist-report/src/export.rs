//! Writing the reconciled dataset and the run report.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use waitlist_model::{CanonicalRecord, ReconcileReport};

use crate::error::{ExportError, Result};
use crate::frame::records_frame;
use crate::pseudonym::Pseudonymizer;

/// File name of the reconciled dataset.
pub const RECORDS_FILE: &str = "reconciled.csv";
/// File name of the run report.
pub const REPORT_FILE: &str = "reconcile_report.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Replace patient and registration ids with keyed pseudonyms.
    pub pseudonymize_seed: Option<String>,
}

impl ExportOptions {
    #[must_use]
    pub fn with_pseudonymize_seed(mut self, seed: Option<String>) -> Self {
        self.pseudonymize_seed = seed;
        self
    }

    pub fn pseudonymizer(&self) -> Option<Pseudonymizer> {
        self.pseudonymize_seed.as_deref().map(Pseudonymizer::new)
    }
}

/// Paths written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub records: PathBuf,
    pub report: PathBuf,
    pub rows: usize,
}

/// Write the records frame as CSV.
pub fn write_records_csv<W: Write>(writer: W, frame: &mut DataFrame) -> Result<()> {
    CsvWriter::new(writer).include_header(true).finish(frame)?;
    Ok(())
}

/// Write the reconciled dataset and the report into `output_dir`.
pub fn write_outputs(
    output_dir: &Path,
    records: &[CanonicalRecord],
    report: &ReconcileReport,
    options: &ExportOptions,
) -> Result<ExportedFiles> {
    fs::create_dir_all(output_dir).map_err(|source| ExportError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let pseudonymizer = options.pseudonymizer();

    let records_path = output_dir.join(RECORDS_FILE);
    let mut frame = records_frame(records, pseudonymizer.as_ref())?;
    let mut writer = BufWriter::new(create_file(&records_path)?);
    write_records_csv(&mut writer, &mut frame)?;
    writer.flush().map_err(|source| ExportError::FileWrite {
        path: records_path.clone(),
        source,
    })?;

    let report_path = output_dir.join(REPORT_FILE);
    let report = match &pseudonymizer {
        Some(pseudonymizer) => pseudonymizer.report(report),
        None => report.clone(),
    };
    let mut writer = BufWriter::new(create_file(&report_path)?);
    serde_json::to_writer_pretty(&mut writer, &report).map_err(|source| ExportError::Json {
        path: report_path.clone(),
        source,
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|source| ExportError::FileWrite {
            path: report_path.clone(),
            source,
        })?;

    info!(
        rows = frame.height(),
        pseudonymized = pseudonymizer.is_some(),
        "reconciled dataset written"
    );
    Ok(ExportedFiles {
        records: records_path,
        report: report_path,
        rows: frame.height(),
    })
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| ExportError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
