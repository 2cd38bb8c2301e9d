use std::env;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tracing::info_span;

use waitlist_cli::config::{CONFIG_ENV, ConfigOverrides, WaitlistConfig};
use waitlist_cli::pipeline::{RunRequest, run};
use waitlist_cli::types::RunResult;
use waitlist_ingest::Field;

use crate::cli::ReconcileArgs;
use crate::summary::{apply_table_style, dim_cell, header_cell};

pub fn run_columns() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Required"),
        header_cell("Recognized columns"),
    ]);
    apply_table_style(&mut table);
    for field in Field::ALL {
        let required = if field.is_required() {
            Cell::new("yes")
        } else {
            dim_cell("no")
        };
        table.add_row(vec![
            Cell::new(field.name()),
            required,
            Cell::new(field.aliases().join(", ")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_reconcile(args: &ReconcileArgs) -> Result<RunResult> {
    let span = info_span!("reconcile", input = %args.input.display());
    let _guard = span.enter();

    let (config, config_path) =
        WaitlistConfig::locate_and_load(args.config.as_deref(), env::var_os(CONFIG_ENV))?;
    let config = config.with_overrides(&overrides_from_args(args));
    let request = RunRequest::new(&args.input)
        .with_output_dir(args.output_dir.clone())
        .with_config(config, config_path)
        .with_dry_run(args.dry_run);
    run(&request)
}

fn overrides_from_args(args: &ReconcileArgs) -> ConfigOverrides {
    ConfigOverrides {
        seed: args.seed.clone(),
        organ: args.organ.clone(),
        min_age: args.min_age,
        listed_from: args.listed_from,
        listed_to: args.listed_to,
    }
}
