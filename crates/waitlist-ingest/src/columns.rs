//! Logical registry fields and the source headers that carry them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{IngestError, Result};

/// A registry field the loader knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    PatientId,
    RegistrationId,
    ListDate,
    RemovalDate,
    RemovalCode,
    LastActiveStatusDate,
    LastInactiveStatusDate,
    TransplantDate,
    DonorType,
    DonorId,
    Organ,
    AgeAtListing,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Self::PatientId,
        Self::RegistrationId,
        Self::ListDate,
        Self::RemovalDate,
        Self::RemovalCode,
        Self::LastActiveStatusDate,
        Self::LastInactiveStatusDate,
        Self::TransplantDate,
        Self::DonorType,
        Self::DonorId,
        Self::Organ,
        Self::AgeAtListing,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PatientId => "patient_id",
            Self::RegistrationId => "registration_id",
            Self::ListDate => "list_date",
            Self::RemovalDate => "removal_date",
            Self::RemovalCode => "removal_code",
            Self::LastActiveStatusDate => "last_active_status_date",
            Self::LastInactiveStatusDate => "last_inactive_status_date",
            Self::TransplantDate => "transplant_date",
            Self::DonorType => "donor_type",
            Self::DonorId => "donor_id",
            Self::Organ => "organ",
            Self::AgeAtListing => "age_at_listing",
        }
    }

    /// Registry header names accepted besides the canonical name.
    #[must_use]
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::PatientId => &["PERS_ID", "PERSON_ID", "TRR_ID_PERS"],
            Self::RegistrationId => &["PX_ID", "WL_ID", "WL_ID_CODE"],
            Self::ListDate => &["CAN_LISTING_DT", "LISTING_DATE"],
            Self::RemovalDate => &["CAN_REM_DT", "REMOVAL_DATE"],
            Self::RemovalCode => &["CAN_REM_CD", "REM_CD"],
            Self::LastActiveStatusDate => &["CAN_LAST_ACT_STAT_DT"],
            Self::LastInactiveStatusDate => &["CAN_LAST_INACT_STAT_DT"],
            Self::TransplantDate => &["REC_TX_DT", "TX_DATE"],
            Self::DonorType => &["DON_TY", "DONOR_TYPE"],
            Self::DonorId => &["DONOR_ID", "DON_ID"],
            Self::Organ => &["WL_ORG", "ORGAN"],
            Self::AgeAtListing => &["CAN_AGE_AT_LISTING", "AGE_AT_LISTING"],
        }
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::PatientId | Self::RegistrationId | Self::ListDate)
    }

    /// Look up a field by its canonical name, ignoring case.
    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(name.trim()))
    }

    fn accepts(&self, header: &str) -> bool {
        header.eq_ignore_ascii_case(self.name())
            || self
                .aliases()
                .iter()
                .any(|alias| header.eq_ignore_ascii_case(alias))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize a raw CSV header: trim, strip a byte-order mark, collapse
/// internal whitespace.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse `[columns]` overrides (field name → source header).
pub fn parse_overrides(raw: &BTreeMap<String, String>) -> Result<BTreeMap<Field, String>> {
    raw.iter()
        .map(|(name, header)| {
            let field = Field::from_name(name)
                .ok_or_else(|| IngestError::UnknownField { name: name.clone() })?;
            Ok((field, normalize_header(header)))
        })
        .collect()
}

/// Column index of every field found in a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: BTreeMap<Field, usize>,
    headers: Vec<String>,
}

impl ColumnMap {
    /// Match headers to fields. An override replaces the canonical name and
    /// aliases of its field. Missing required fields are an error.
    pub fn resolve(
        headers: &[String],
        overrides: &BTreeMap<Field, String>,
        path: &Path,
    ) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut indices = BTreeMap::new();
        for field in Field::ALL {
            let position = match overrides.get(&field) {
                Some(header) => headers.iter().position(|h| h.eq_ignore_ascii_case(header)),
                None => headers.iter().position(|h| field.accepts(h)),
            };
            match position {
                Some(idx) => {
                    indices.insert(field, idx);
                }
                None if field.is_required() => {
                    let accepted = match overrides.get(&field) {
                        Some(header) => header.clone(),
                        None => std::iter::once(field.name())
                            .chain(field.aliases().iter().copied())
                            .collect::<Vec<_>>()
                            .join(", "),
                    };
                    return Err(IngestError::MissingColumn {
                        field: field.name(),
                        accepted,
                        path: path.to_path_buf(),
                    });
                }
                None => {}
            }
        }
        Ok(Self { indices, headers })
    }

    pub fn index(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.indices.contains_key(&field)
    }

    /// Normalized source header mapped to `field`.
    pub fn header(&self, field: Field) -> Option<&str> {
        self.index(field)
            .and_then(|idx| self.headers.get(idx))
            .map(String::as_str)
    }

    /// Trimmed cell for `field`, `None` when the column is absent.
    pub fn cell<'a>(&self, record: &'a csv::StringRecord, field: Field) -> Option<&'a str> {
        self.index(field)
            .and_then(|idx| record.get(idx))
            .map(|value| value.trim().trim_matches('\u{feff}'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn normalize_header_strips_bom_and_spaces() {
        assert_eq!(normalize_header("\u{feff} PERS_ID "), "PERS_ID");
        assert_eq!(normalize_header("list   date"), "list date");
    }

    #[test]
    fn registry_aliases_resolve() {
        let map = ColumnMap::resolve(
            &headers(&["\u{feff}PERS_ID", "px_id", "CAN_LISTING_DT", "REC_TX_DT"]),
            &BTreeMap::new(),
            Path::new("registry.csv"),
        )
        .expect("resolve columns");
        assert_eq!(map.index(Field::PatientId), Some(0));
        assert_eq!(map.index(Field::RegistrationId), Some(1));
        assert_eq!(map.header(Field::TransplantDate), Some("REC_TX_DT"));
        assert!(!map.contains(Field::DonorType));
    }

    #[test]
    fn override_replaces_aliases() {
        let overrides = BTreeMap::from([(Field::ListDate, "first_listed".to_string())]);
        let map = ColumnMap::resolve(
            &headers(&["patient_id", "registration_id", "list_date", "first_listed"]),
            &overrides,
            Path::new("registry.csv"),
        )
        .expect("resolve columns");
        assert_eq!(map.index(Field::ListDate), Some(3));
    }

    #[test]
    fn missing_required_column_lists_accepted_headers() {
        let err = ColumnMap::resolve(
            &headers(&["patient_id", "registration_id"]),
            &BTreeMap::new(),
            Path::new("registry.csv"),
        )
        .expect_err("list date is required");
        assert!(err.to_string().contains("CAN_LISTING_DT"));
    }

    #[test]
    fn unknown_override_field_is_rejected() {
        let raw = BTreeMap::from([("listing".to_string(), "X".to_string())]);
        assert!(matches!(
            parse_overrides(&raw),
            Err(IngestError::UnknownField { .. })
        ));
    }
}
