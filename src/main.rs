// ipsift - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Dispatch to quick, custom or inspect runs
// 4. Run summary and record preview on stdout

use clap::{Args, Parser, Subcommand, ValueEnum};
use ipsift::app::pipeline::{self, RunOptions, RunOutcome};
use ipsift::core::model::ExtractMode;
use ipsift::core::template::TemplateSpec;
use ipsift::platform::config::{self, AppConfig, PlatformPaths};
use ipsift::util::{self, constants};
use std::path::{Path, PathBuf};

/// ipsift - extract address/port records from messy text, tables and proxy
/// link lists.
///
/// Pass a file directly to extract with defaults chosen from its content.
#[derive(Parser, Debug)]
#[command(name = "ipsift", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    /// File to extract from with content-based defaults.
    file: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Config file to use instead of the platform default.
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Quick extraction in one of the fixed output shapes.
    Extract(ExtractArgs),
    /// Render selected columns through a format template.
    Custom(CustomArgs),
    /// Show the inferred table shape of a file.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Input file.
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Output shape (defaults to the configured mode).
    #[arg(short = 'm', long = "mode", value_enum)]
    mode: Option<ModeArg>,

    /// Output file name; `.txt` is appended when missing.
    #[arg(short = 'o', long = "out")]
    out: Option<String>,

    /// Port paired with addresses that have none.
    #[arg(short = 'p', long = "port", value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Drop portless addresses instead of pairing them with a default port.
    #[arg(long = "no-default-port", conflicts_with = "port")]
    no_default_port: bool,
}

#[derive(Args, Debug)]
struct CustomArgs {
    /// Input file.
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// 1-based column indices in output order.
    #[arg(long = "columns", num_args = 1.., required = true)]
    columns: Vec<usize>,

    /// Format template using [1]..[9]; defaults to the preset for the
    /// number of selected columns.
    #[arg(long = "format")]
    format: Option<String>,

    /// Keep duplicate output lines.
    #[arg(long = "no-dedupe")]
    no_dedupe: bool,

    /// Order by this selected column (1-based) instead of the output line.
    #[arg(long = "sort-by")]
    sort_by: Option<usize>,

    /// Output file name; `.txt` is appended when missing.
    #[arg(short = 'o', long = "out")]
    out: Option<String>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Input file.
    #[arg(short = 'f', long = "file")]
    file: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// host:port#remark
    Ipportremark,
    /// host port
    Ipspace,
    /// host
    Iponly,
}

impl From<ModeArg> for ExtractMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Ipportremark => ExtractMode::IpPortRemark,
            ModeArg::Ipspace => ExtractMode::IpSpacePort,
            ModeArg::Iponly => ExtractMode::IpOnly,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (app_config, warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "ipsift starting"
    );
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let result = match (cli.command, cli.file) {
        (Some(Command::Extract(args)), _) => run_extract(args, &app_config),
        (Some(Command::Custom(args)), _) => run_custom(args, &app_config),
        (Some(Command::Inspect(args)), _) => run_inspect(&args.file),
        (None, Some(file)) => run_dropped(&file, &app_config),
        (None, None) => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn output_name(explicit: Option<String>, app_config: &AppConfig, fallback: &str) -> String {
    explicit
        .or_else(|| app_config.output_stem.clone())
        .unwrap_or_else(|| fallback.to_string())
}

fn run_extract(args: ExtractArgs, app_config: &AppConfig) -> util::error::Result<()> {
    let mode = args.mode.map(ExtractMode::from).unwrap_or(app_config.mode);
    let default_port = if args.no_default_port {
        None
    } else {
        Some(args.port.unwrap_or(app_config.default_port).to_string())
    };

    println!("Input:        {}", args.file.display());
    println!("Mode:         {mode}");
    println!(
        "Default port: {}",
        default_port.as_deref().unwrap_or("none")
    );

    let outcome = pipeline::run_quick(&args.file, &RunOptions { mode, default_port })?;
    let name = output_name(args.out, app_config, mode.output_stem());
    finish_quick(outcome, &name)
}

fn run_dropped(file: &Path, app_config: &AppConfig) -> util::error::Result<()> {
    println!("Input: {}", file.display());
    let outcome = pipeline::run_dropped(file)?;
    println!("Mode:  {}", outcome.mode);
    let name = output_name(None, app_config, outcome.mode.output_stem());
    finish_quick(outcome, &name)
}

fn finish_quick(outcome: RunOutcome, name: &str) -> util::error::Result<()> {
    println!("Source: {}", outcome.kind.label());
    if outcome.records.is_empty() {
        println!("No records extracted; nothing written.");
        return Ok(());
    }
    let path = pipeline::write_output(&outcome.records, name)?;
    print_summary(&outcome.records, &path);
    Ok(())
}

fn run_custom(args: CustomArgs, app_config: &AppConfig) -> util::error::Result<()> {
    let spec = TemplateSpec {
        columns: args.columns,
        format: args.format,
        dedupe: !args.no_dedupe,
        sort_by: args.sort_by,
    };
    let records = pipeline::run_custom(&args.file, &spec)?;
    if records.is_empty() {
        println!("No records produced; nothing written.");
        return Ok(());
    }
    let name = output_name(args.out, app_config, constants::OUTPUT_STEM_CUSTOM);
    let path = pipeline::write_output(&records, &name)?;
    print_summary(&records, &path);
    Ok(())
}

fn run_inspect(file: &Path) -> util::error::Result<()> {
    let Some(table) = pipeline::inspect(file)? else {
        println!("Cannot infer structure: no consistent delimiter found.");
        return Ok(());
    };

    println!("Delimiter: {:?}", table.delimiter);
    println!("Fields:    {}", table.field_count);
    println!("Rows:      {}", table.rows.len());
    println!("Columns:   {}", table.column_count());
    for i in 0..table.column_count() {
        let samples: Vec<&str> = table
            .column_values(i)
            .filter(|v| !v.is_empty())
            .take(constants::INSPECT_SAMPLES_PER_COLUMN)
            .collect();
        let preview = if samples.is_empty() {
            "(empty)".to_string()
        } else {
            samples.join(" | ")
        };
        println!("  {}. {} -> {preview}", i + 1, table.header(i));
    }
    Ok(())
}

fn print_summary(records: &[String], path: &Path) {
    println!("Records:      {}", records.len());
    println!("Output file:  {}", path.display());
    println!("Preview (first {}):", constants::PREVIEW_RECORDS);
    for (i, record) in records.iter().take(constants::PREVIEW_RECORDS).enumerate() {
        println!("  {}. {record}", i + 1);
    }
}
