//! Registry CSV loading.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use waitlist_model::{ModelError, PatientId, Registration, RegistrationId};

use crate::columns::{ColumnMap, Field};
use crate::dates::{is_null, parse_date};
use crate::error::{IngestError, Result};
use crate::filter::{Candidate, Exclusion, PopulationFilter};

/// How to read a registry file.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Source header per field, replacing the built-in aliases.
    pub columns: BTreeMap<Field, String>,
    pub population: PopulationFilter,
}

impl LoadOptions {
    #[must_use]
    pub fn with_columns(mut self, columns: BTreeMap<Field, String>) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn with_population(mut self, population: PopulationFilter) -> Self {
        self.population = population;
        self
    }
}

/// Registrations read from one file.
#[derive(Debug, Clone, Default)]
pub struct LoadedRegistry {
    pub registrations: Vec<Registration>,
    /// Non-blank data rows in the file.
    pub rows_read: usize,
    /// Rows left out by the population filter, per reason.
    pub excluded: BTreeMap<Exclusion, usize>,
}

impl LoadedRegistry {
    pub fn excluded_count(&self) -> usize {
        self.excluded.values().sum()
    }
}

/// Load a registry CSV file.
pub fn load_registrations(path: &Path, options: &LoadOptions) -> Result<LoadedRegistry> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    read_registrations(file, path, options)
}

/// Load registrations from any reader; `path` is used for error context.
pub fn read_registrations<R: Read>(
    input: R,
    path: &Path,
    options: &LoadOptions,
) -> Result<LoadedRegistry> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    let columns = ColumnMap::resolve(&headers, &options.columns, path)?;

    let mut loaded = LoadedRegistry::default();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        // Line number in the file; the header is line 1.
        let row = idx + 2;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        loaded.rows_read += 1;

        let cells = RowReader {
            record: &record,
            columns: &columns,
            path,
            row,
        };
        let registration = cells.registration()?;
        let key = registration.registration_id.as_str().to_string();
        if let Some(&first_row) = first_seen.get(&key) {
            return Err(IngestError::DuplicateRegistration {
                path: path.to_path_buf(),
                registration_id: key,
                first_row,
                row,
            });
        }
        first_seen.insert(key, row);

        let candidate = Candidate {
            list_date: registration.list_date,
            organ: cells.text(Field::Organ),
            age_at_listing: cells.number(Field::AgeAtListing)?,
        };
        if let Some(exclusion) = options.population.check(&candidate) {
            debug!(row, reason = %exclusion, "row outside study population");
            *loaded.excluded.entry(exclusion).or_insert(0) += 1;
            continue;
        }
        loaded.registrations.push(registration);
    }

    info!(
        path = %path.display(),
        rows = loaded.rows_read,
        kept = loaded.registrations.len(),
        excluded = loaded.excluded_count(),
        "registry loaded"
    );
    for (exclusion, count) in &loaded.excluded {
        info!(reason = %exclusion, rows = count, "population filter");
    }
    Ok(loaded)
}

struct RowReader<'a> {
    record: &'a StringRecord,
    columns: &'a ColumnMap,
    path: &'a Path,
    row: usize,
}

impl<'a> RowReader<'a> {
    fn registration(&self) -> Result<Registration> {
        let patient_id = PatientId::new(self.required(Field::PatientId)?)
            .map_err(|source| self.invalid_id(source))?;
        let registration_id = RegistrationId::new(self.required(Field::RegistrationId)?)
            .map_err(|source| self.invalid_id(source))?;
        let list_date = self
            .date(Field::ListDate)?
            .ok_or_else(|| self.missing(Field::ListDate))?;

        let mut registration = Registration::new(patient_id, registration_id, list_date);
        registration.removal_date = self.date(Field::RemovalDate)?;
        registration.removal_code = self.text(Field::RemovalCode).map(str::to_string);
        registration.last_active_status_date = self.date(Field::LastActiveStatusDate)?;
        registration.last_inactive_status_date = self.date(Field::LastInactiveStatusDate)?;
        registration.transplant_date = self.date(Field::TransplantDate)?;
        registration.donor_type = self.text(Field::DonorType).map(str::to_string);
        registration.donor_id = self.text(Field::DonorId).map(str::to_string);
        Ok(registration)
    }

    /// Non-null cell, `None` for absent columns and null markers.
    fn text(&self, field: Field) -> Option<&'a str> {
        self.columns
            .cell(self.record, field)
            .filter(|value| !is_null(value))
    }

    fn required(&self, field: Field) -> Result<&'a str> {
        self.text(field).ok_or_else(|| self.missing(field))
    }

    fn date(&self, field: Field) -> Result<Option<NaiveDate>> {
        let Some(value) = self.columns.cell(self.record, field) else {
            return Ok(None);
        };
        parse_date(value).map_err(|_| IngestError::InvalidDate {
            path: self.path.to_path_buf(),
            row: self.row,
            column: self.column_name(field),
            value: value.to_string(),
        })
    }

    fn number(&self, field: Field) -> Result<Option<f64>> {
        let Some(value) = self.text(field) else {
            return Ok(None);
        };
        value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| IngestError::InvalidNumber {
                path: self.path.to_path_buf(),
                row: self.row,
                column: self.column_name(field),
                value: value.to_string(),
            })
    }

    fn column_name(&self, field: Field) -> String {
        self.columns
            .header(field)
            .unwrap_or(field.name())
            .to_string()
    }

    fn missing(&self, field: Field) -> IngestError {
        IngestError::MissingValue {
            path: self.path.to_path_buf(),
            row: self.row,
            field: field.name(),
        }
    }

    fn invalid_id(&self, source: ModelError) -> IngestError {
        IngestError::InvalidId {
            path: self.path.to_path_buf(),
            row: self.row,
            source,
        }
    }
}
