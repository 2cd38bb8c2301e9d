use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use waitlist_ingest::{
    Exclusion, Field, IngestError, LoadOptions, PopulationFilter, load_registrations,
    read_registrations,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn write_registry(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("registry.csv");
    fs::write(&path, contents).expect("write registry");
    path
}

const SRTR_EXTRACT: &str = "\u{feff}PERS_ID,PX_ID,CAN_LISTING_DT,CAN_REM_DT,CAN_REM_CD,\
CAN_LAST_ACT_STAT_DT,CAN_LAST_INACT_STAT_DT,REC_TX_DT,DON_TY,DONOR_ID,WL_ORG,CAN_AGE_AT_LISTING
100,9001,2015-01-01,2017-03-10,4,,,,,,KI,54
100,9002,02/01/2015,,,,,05MAR2017,C,D-1,KI,54
200,9003,2016-06-01,.,,2017-01-15,2017-02-01,,,,KI,17
300,9004,2014-02-01,2014-09-01,13,,,,,,LI,60
";

#[test]
fn loads_registry_aliases_and_date_layouts() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_registry(&dir, SRTR_EXTRACT);

    let loaded = load_registrations(&path, &LoadOptions::default()).expect("load registry");

    assert_eq!(loaded.rows_read, 4);
    assert_eq!(loaded.registrations.len(), 4);
    assert_eq!(loaded.excluded_count(), 0);

    let first = &loaded.registrations[0];
    assert_eq!(first.patient_id.as_str(), "100");
    assert_eq!(first.registration_id.as_str(), "9001");
    assert_eq!(first.removal_date, Some(date(2017, 3, 10)));
    assert_eq!(first.removal_code.as_deref(), Some("4"));
    assert_eq!(first.transplant_date, None);

    let second = &loaded.registrations[1];
    assert_eq!(second.list_date, date(2015, 2, 1));
    assert_eq!(second.transplant_date, Some(date(2017, 3, 5)));
    assert_eq!(second.donor_type.as_deref(), Some("C"));
    assert_eq!(second.donor_id.as_deref(), Some("D-1"));

    let third = &loaded.registrations[2];
    assert_eq!(third.removal_date, None);
    assert_eq!(third.last_active_status_date, Some(date(2017, 1, 15)));
    assert_eq!(third.last_inactive_status_date, Some(date(2017, 2, 1)));
}

#[test]
fn population_filter_counts_exclusions() {
    let population = PopulationFilter {
        list_date_from: Some(date(2015, 1, 1)),
        organ: Some("KI".to_string()),
        min_age: Some(18.0),
        ..PopulationFilter::default()
    };
    let options = LoadOptions::default().with_population(population);
    let loaded = read_registrations(SRTR_EXTRACT.as_bytes(), Path::new("extract.csv"), &options)
        .expect("load registry");

    let kept: Vec<&str> = loaded
        .registrations
        .iter()
        .map(|r| r.registration_id.as_str())
        .collect();
    assert_eq!(kept, ["9001", "9002"]);
    assert_eq!(
        loaded.excluded,
        BTreeMap::from([(Exclusion::ListedBeforeWindow, 1), (Exclusion::Age, 1)])
    );
}

#[test]
fn column_overrides_replace_aliases() {
    let csv = "person,listing,listed_on,tx\nA,L1,2016-01-01,2016-09-01\n";
    let columns = BTreeMap::from([
        (Field::PatientId, "person".to_string()),
        (Field::RegistrationId, "listing".to_string()),
        (Field::ListDate, "listed_on".to_string()),
        (Field::TransplantDate, "TX".to_string()),
    ]);
    let options = LoadOptions::default().with_columns(columns);
    let loaded =
        read_registrations(csv.as_bytes(), Path::new("custom.csv"), &options).expect("load");
    assert_eq!(loaded.registrations.len(), 1);
    assert_eq!(loaded.registrations[0].transplant_date, Some(date(2016, 9, 1)));
}

#[test]
fn duplicate_registration_id_aborts() {
    let csv = "patient_id,registration_id,list_date\nA,R1,2016-01-01\nB,R1,2016-02-01\n";
    let err = read_registrations(csv.as_bytes(), Path::new("dup.csv"), &LoadOptions::default())
        .expect_err("duplicate id");
    assert!(matches!(
        err,
        IngestError::DuplicateRegistration {
            first_row: 2,
            row: 3,
            ..
        }
    ));
}

#[test]
fn invalid_date_reports_row_and_column() {
    let csv = "patient_id,registration_id,list_date,REC_TX_DT\nA,R1,2016-01-01,soon\n";
    let err = read_registrations(csv.as_bytes(), Path::new("bad.csv"), &LoadOptions::default())
        .expect_err("invalid date");
    assert_eq!(
        err.to_string(),
        "invalid date 'soon' in column REC_TX_DT at row 2 of bad.csv"
    );
}

#[test]
fn missing_list_date_value_is_an_error() {
    let csv = "patient_id,registration_id,list_date\nA,R1,NA\n";
    let err = read_registrations(csv.as_bytes(), Path::new("gap.csv"), &LoadOptions::default())
        .expect_err("missing list date");
    assert!(matches!(
        err,
        IngestError::MissingValue {
            row: 2,
            field: "list_date",
            ..
        }
    ));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let err = load_registrations(&dir.path().join("absent.csv"), &LoadOptions::default())
        .expect_err("missing file");
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn population_filter_reads_from_toml() {
    let filter: PopulationFilter = toml::from_str(
        r#"
list_date_from = "2015-01-01"
list_date_to = "2019-12-31"
organ = "KI"
min_age = 18.0
"#,
    )
    .expect("parse filter");
    assert_eq!(filter.list_date_from, Some(date(2015, 1, 1)));
    assert_eq!(filter.list_date_to, Some(date(2019, 12, 31)));
    assert_eq!(filter.min_age, Some(18.0));
}
