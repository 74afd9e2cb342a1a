use std::env;
use std::path::PathBuf;

pub struct CliOptions {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub validate_power: bool,
    pub override_inv_quantity: bool,
    pub inverter_quantity: Option<u32>,
    pub frontend: bool,
    pub json_out: Option<PathBuf>,
    pub csv_out: Option<PathBuf>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut input = None;
    let mut config = None;
    let mut preset = None;
    let mut validate_power = false;
    let mut override_inv_quantity = false;
    let mut inverter_quantity = None;
    let mut frontend = false;
    let mut json_out = None;
    let mut csv_out = None;

    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --input (expected a JSON file path)")?;
                if input.replace(PathBuf::from(path)).is_some() {
                    return Err("--input provided more than once".to_string());
                }
            }
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--inverter-quantity" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --inverter-quantity (expected a positive integer)",
                )?;
                let n = raw
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| format!("--inverter-quantity value \"{raw}\" is not a positive integer"))?;
                inverter_quantity = Some(n);
            }
            "--json-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --json-out (expected a file path)")?;
                if json_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--json-out provided more than once".to_string());
                }
            }
            "--csv-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --csv-out (expected a file path)")?;
                if csv_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--csv-out provided more than once".to_string());
                }
            }
            "--validate-power" => validate_power = true,
            "--override-inv-quantity" => override_inv_quantity = true,
            "--frontend" => frontend = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    let input = input.ok_or_else(|| "missing required argument --input".to_string())?;

    Ok(CliOptions {
        input,
        config,
        preset,
        validate_power,
        override_inv_quantity,
        inverter_quantity,
        frontend,
        json_out,
        csv_out,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("pv-stringer: wire a rooftop PV layout into strings, MPPTs and inverters");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  pv-stringer --input <project.json> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>            Load optimizer tuning from a TOML file");
    eprintln!("  --preset <name>            Use a built-in tuning preset (default, tight, loose)");
    eprintln!("  --validate-power           Cap strings and inverters by the AC rating");
    eprintln!("  --inverter-quantity <n>    Requested number of inverter instances");
    eprintln!("  --override-inv-quantity    Allow more instances than requested");
    eprintln!("  --frontend                 Emit the nested inverter-centric JSON shape");
    eprintln!("  --json-out <path>          Write the full result as JSON");
    eprintln!("  --csv-out <path>           Write one CSV row per string");
    eprintln!("  --help                     Show this help message");
}
