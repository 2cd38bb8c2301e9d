//! Run configuration: TOML file plus command-line overrides.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use waitlist_core::ReconcileOptions;
use waitlist_ingest::{LoadOptions, PopulationFilter, parse_overrides};
use waitlist_model::DonorCodes;
use waitlist_report::ExportOptions;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "WAITLIST_CONFIG";

/// Contents of a configuration file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitlistConfig {
    pub population: PopulationFilter,
    pub donor_codes: DonorCodes,
    /// Field name to source header.
    pub columns: BTreeMap<String, String>,
    pub export: ExportOptions,
}

/// Values given on the command line; each one set replaces the file value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub seed: Option<String>,
    pub organ: Option<String>,
    pub min_age: Option<f64>,
    pub listed_from: Option<NaiveDate>,
    pub listed_to: Option<NaiveDate>,
}

impl WaitlistConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("parse configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read configuration: {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("load configuration: {}", path.display()))
    }

    /// Load the file named explicitly or by `env_value`; defaults when neither
    /// is set.
    pub fn locate_and_load(
        explicit: Option<&Path>,
        env_value: Option<OsString>,
    ) -> Result<(Self, Option<PathBuf>)> {
        match resolve_config_path(explicit, env_value) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(seed) = &overrides.seed {
            self.export.pseudonymize_seed = Some(seed.clone());
        }
        if let Some(organ) = &overrides.organ {
            self.population.organ = Some(organ.clone());
        }
        if let Some(min_age) = overrides.min_age {
            self.population.min_age = Some(min_age);
        }
        if let Some(from) = overrides.listed_from {
            self.population.list_date_from = Some(from);
        }
        if let Some(to) = overrides.listed_to {
            self.population.list_date_to = Some(to);
        }
        self
    }

    pub fn load_options(&self) -> Result<LoadOptions> {
        let columns = parse_overrides(&self.columns).context("read [columns] section")?;
        Ok(LoadOptions::default()
            .with_columns(columns)
            .with_population(self.population.clone()))
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions::default().with_donor_codes(self.donor_codes.clone())
    }
}

/// The explicit path wins over the environment; blank values count as unset.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env_value.filter(|value| !value.is_empty()).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_beats_environment() {
        let explicit = PathBuf::from("cli.toml");
        assert_eq!(
            resolve_config_path(Some(&explicit), Some(OsString::from("env.toml"))),
            Some(explicit)
        );
        assert_eq!(
            resolve_config_path(None, Some(OsString::from("env.toml"))),
            Some(PathBuf::from("env.toml"))
        );
        assert_eq!(resolve_config_path(None, Some(OsString::new())), None);
        assert_eq!(resolve_config_path(None, None), None);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = WaitlistConfig::from_toml_str("").expect("parse");
        assert_eq!(config, WaitlistConfig::default());
        assert_eq!(config.donor_codes.deceased, "C");
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(WaitlistConfig::from_toml_str("[populaton]\norgan = \"KI\"\n").is_err());
    }
}
