//! Run stages: ingest, reconcile, export.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use waitlist_core::{Reconciliation, reconcile};
use waitlist_ingest::{LoadedRegistry, load_registrations};
use waitlist_report::{ExportedFiles, write_outputs};

use crate::config::WaitlistConfig;
use crate::logging::redact_value;
use crate::types::RunResult;

/// Directory name used next to the input when no output directory is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// One reconciliation run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub config: WaitlistConfig,
    pub config_path: Option<PathBuf>,
    /// Reconcile and report without writing files.
    pub dry_run: bool,
}

impl RunRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: None,
            config: WaitlistConfig::default(),
            config_path: None,
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: WaitlistConfig, path: Option<PathBuf>) -> Self {
        self.config = config;
        self.config_path = path;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&self.input))
    }
}

pub fn default_output_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_OUTPUT_DIR)
}

pub fn ingest(input: &Path, config: &WaitlistConfig) -> Result<LoadedRegistry> {
    let span = info_span!("ingest");
    let _guard = span.enter();
    let start = Instant::now();
    let options = config.load_options()?;
    let loaded = load_registrations(input, &options)
        .with_context(|| format!("load registry: {}", input.display()))?;
    info!(
        registrations = loaded.registrations.len(),
        excluded = loaded.excluded_count(),
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(loaded)
}

pub fn output(
    output_dir: &Path,
    reconciliation: &Reconciliation,
    config: &WaitlistConfig,
) -> Result<ExportedFiles> {
    let span = info_span!("export");
    let _guard = span.enter();
    let start = Instant::now();
    let files = write_outputs(
        output_dir,
        &reconciliation.records,
        &reconciliation.report,
        &config.export,
    )
    .with_context(|| format!("write outputs: {}", output_dir.display()))?;
    info!(
        rows = files.rows,
        pseudonymized = config.export.pseudonymize_seed.is_some(),
        duration_ms = start.elapsed().as_millis(),
        "export complete"
    );
    Ok(files)
}

/// Load, reconcile, and (unless dry-running) export.
pub fn run(request: &RunRequest) -> Result<RunResult> {
    let loaded = ingest(&request.input, &request.config)?;
    let reconciliation = reconcile(&loaded.registrations, &request.config.reconcile_options());
    for failure in &reconciliation.report.failures {
        debug!(
            patient_id = redact_value(failure.patient_id.as_str()),
            kind = %failure.kind,
            registrations = failure.registration_ids.len(),
            "patient failure"
        );
    }
    for warning in &reconciliation.report.warnings {
        debug!(
            patient_id = redact_value(warning.patient_id.as_str()),
            kind = %warning.kind,
            "data quality warning"
        );
    }

    let output_dir = request.resolved_output_dir();
    let outputs = if request.dry_run {
        info!("dry run, no files written");
        None
    } else {
        Some(output(&output_dir, &reconciliation, &request.config)?)
    };

    Ok(RunResult {
        input: request.input.clone(),
        config_path: request.config_path.clone(),
        output_dir,
        rows_read: loaded.rows_read,
        excluded: loaded.excluded,
        report: reconciliation.report,
        outputs,
    })
}
