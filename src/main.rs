//! pv-stringer entry point: CLI wiring, config loading, and report output.

mod cli;

use std::fs;
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use pv_stringer::config::OptimizerConfig;
use pv_stringer::io::export::export_strings_csv;
use pv_stringer::io::input::load_project;
use pv_stringer::io::output::to_json;
use pv_stringer::optimize;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pv_stringer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match cli::parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    // --config takes priority, then --preset, then built-in defaults
    let config = if let Some(ref path) = cli.config {
        OptimizerConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        OptimizerConfig::from_preset(name)
    } else {
        Ok(OptimizerConfig::default())
    };
    let config = config.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let (project, mut options) = load_project(&cli.input).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    info!(path = %cli.input.display(), panels = project.layout.len(), "project loaded");

    // Command-line switches add to what the project file requests
    options.validate_power |= cli.validate_power;
    options.override_inv_quantity |= cli.override_inv_quantity;
    options.output_frontend |= cli.frontend;
    if cli.inverter_quantity.is_some() {
        options.inverter_quantity = cli.inverter_quantity;
    }

    let result = optimize(&project, &options, &config).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    println!("{}", result.summary);
    if !result.suggestions.is_empty() {
        println!("--- Suggestions ---");
        for s in &result.suggestions {
            println!("  - {s}");
        }
    }

    if let Some(ref path) = cli.json_out {
        let written = to_json(&result, options.output_frontend)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("error: failed to write JSON: {e}");
            process::exit(1);
        }
        eprintln!("Result written to {}", path.display());
    }

    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_strings_csv(&result.strings, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Strings written to {}", path.display());
    }
}
