//! End-to-end runs over a registry file on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use waitlist_cli::config::{ConfigOverrides, WaitlistConfig};
use waitlist_cli::pipeline::{DEFAULT_OUTPUT_DIR, RunRequest, run};
use waitlist_ingest::Exclusion;
use waitlist_model::{FailureKind, Outcome};
use waitlist_report::{RECORDS_FILE, REPORT_FILE};

const REGISTRY: &str = "\
patient_id,registration_id,list_date,removal_date,removal_code,transplant_date,donor_type,organ,age_at_listing
A,A1,2016-01-01,2016-12-31,4,,,KI,50
B,B1,2015-01-01,2015-06-01,7,,,KI,40
B,B2,2015-07-01,,,2016-01-10,C,KI,40
C,C1,2017-01-01,,,,,KI,30
D,D1,2016-03-01,2016-09-01,4,,,LI,60
";

fn write_registry(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("registry.csv");
    fs::write(&path, REGISTRY).expect("write registry");
    path
}

fn kidney_only() -> WaitlistConfig {
    WaitlistConfig::default().with_overrides(&ConfigOverrides {
        organ: Some("KI".to_string()),
        ..ConfigOverrides::default()
    })
}

#[test]
fn reconcile_writes_records_and_report() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_registry(&dir);
    let request = RunRequest::new(&input).with_config(kidney_only(), None);

    let result = run(&request).expect("run");

    assert_eq!(result.output_dir, dir.path().join(DEFAULT_OUTPUT_DIR));
    assert_eq!(result.rows_read, 5);
    assert_eq!(result.excluded, BTreeMap::from([(Exclusion::Organ, 1)]));

    let report = &result.report;
    assert_eq!(report.input_patients, 3);
    assert_eq!(report.input_registrations, 4);
    assert_eq!(report.output_records, 3);
    assert_eq!(report.patients.single, 1);
    assert_eq!(report.patients.sequential, 1);
    assert_eq!(report.registrations.sequential, 2);
    assert_eq!(report.outcome_count(Outcome::RemovedOrDied), 2);
    assert_eq!(report.outcome_count(Outcome::Ddkt), 1);

    assert!(result.has_failures());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].patient_id.as_str(), "C");
    assert_eq!(report.failures[0].kind, FailureKind::MissingDate);

    let files = result.outputs.expect("outputs written");
    assert_eq!(files.rows, 3);
    assert_eq!(files.records, result.output_dir.join(RECORDS_FILE));
    let csv = fs::read_to_string(&files.records).expect("read records");
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("A,A1,single,0,2016-01-01,2016-12-31,2016-12-31,365,"));
    assert!(rows[1].starts_with("B,B1,sequential,0,2015-01-01,2015-06-01,2015-06-01,151,"));
    assert!(rows[2].starts_with("B,B2,sequential,0,2015-07-01,2016-01-10,2016-01-10,193,DDKT,"));

    let report_json = fs::read_to_string(result.output_dir.join(REPORT_FILE)).expect("read report");
    assert!(report_json.contains("\"missing_date\""));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_registry(&dir);
    let output_dir = dir.path().join("never");
    let request = RunRequest::new(&input)
        .with_output_dir(Some(output_dir.clone()))
        .with_dry_run(true);

    let result = run(&request).expect("run");

    assert!(result.outputs.is_none());
    assert!(!output_dir.exists());
    assert_eq!(result.report.input_patients, 4);
    assert_eq!(result.report.output_records, 4);
}

#[test]
fn config_file_drives_the_run() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_registry(&dir);
    let config_path = dir.path().join("waitlist.toml");
    fs::write(
        &config_path,
        r#"
[population]
list_date_from = "2016-01-01"

[donor_codes]
deceased = "DEC"
living = "LIV"

[export]
pseudonymize_seed = "cohort-7"
"#,
    )
    .expect("write config");

    let (config, path) =
        WaitlistConfig::locate_and_load(None, Some(config_path.clone().into_os_string()))
            .expect("load config");
    assert_eq!(path.as_ref(), Some(&config_path));
    assert_eq!(config.donor_codes.deceased, "DEC");

    let request = RunRequest::new(&input)
        .with_output_dir(Some(dir.path().join("out")))
        .with_config(config, path);
    let result = run(&request).expect("run");

    // B listed before the window; C still fails, A and D remain.
    assert_eq!(
        result.excluded,
        BTreeMap::from([(Exclusion::ListedBeforeWindow, 2)])
    );
    assert_eq!(result.report.output_records, 2);

    let files = result.outputs.expect("outputs written");
    let csv = fs::read_to_string(&files.records).expect("read records");
    assert!(!csv.contains("A1"));
    assert!(!csv.contains("D1"));
}

#[test]
fn command_line_overrides_replace_file_values() {
    let config = WaitlistConfig::from_toml_str(
        r#"
[population]
organ = "LI"
min_age = 18.0

[export]
pseudonymize_seed = "from-file"
"#,
    )
    .expect("parse config");
    let config = config.with_overrides(&ConfigOverrides {
        seed: Some("from-cli".to_string()),
        organ: Some("KI".to_string()),
        ..ConfigOverrides::default()
    });

    assert_eq!(config.population.organ.as_deref(), Some("KI"));
    assert_eq!(config.population.min_age, Some(18.0));
    assert_eq!(config.export.pseudonymize_seed.as_deref(), Some("from-cli"));
}

#[test]
fn unknown_column_field_is_rejected() {
    let config = WaitlistConfig::from_toml_str("[columns]\nlisting_day = \"LISTED\"\n")
        .expect("parse config");
    assert!(config.load_options().is_err());
}

#[test]
fn missing_input_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let request = RunRequest::new(dir.path().join("absent.csv"));
    let error = run(&request).expect_err("missing input");
    assert!(format!("{error:#}").contains("absent.csv"));
}
