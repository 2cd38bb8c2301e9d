use std::collections::BTreeMap;
use std::path::PathBuf;

use waitlist_ingest::Exclusion;
use waitlist_model::ReconcileReport;
use waitlist_report::ExportedFiles;

/// Outcome of one `reconcile` run.
#[derive(Debug)]
pub struct RunResult {
    pub input: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Data rows read from the input.
    pub rows_read: usize,
    /// Rows left out by the population filter, per reason.
    pub excluded: BTreeMap<Exclusion, usize>,
    pub report: ReconcileReport,
    /// Files written; `None` on a dry run.
    pub outputs: Option<ExportedFiles>,
}

impl RunResult {
    pub fn has_failures(&self) -> bool {
        self.report.has_failures()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.values().sum()
    }
}
