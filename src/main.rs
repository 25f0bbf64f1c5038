use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use slidesnap::SessionConfig;

#[derive(Parser, Debug)]
#[command(
    name = "slidesnap",
    version,
    about = "Snapshot rendered HTML pages into fixed 1920x1080 documents and verify the result"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    session: SessionArgs,

    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render INPUT and write an absolutely-positioned snapshot document to OUTPUT
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Also write the captured snapshot as JSON to this path
        #[arg(long)]
        dump_snapshot: Option<PathBuf>,
    },
    /// Report text units that extend past the 1920x1080 canvas
    #[command(name = "check-overflow")]
    CheckOverflow(CheckArgs),
    /// Report pairs of text units whose boxes overlap
    #[command(name = "check-overlap")]
    CheckOverlap(CheckArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Emitted snapshot document to analyze
    file: PathBuf,
    /// Print the report as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Exit with status 2 when any issue is found
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Chrome/Chromium binary to launch
    #[arg(long, global = true)]
    chrome: Option<PathBuf>,
    /// Milliseconds to wait for web fonts before continuing
    #[arg(long, global = true)]
    font_timeout_ms: Option<u64>,
    /// Milliseconds to wait for animations before continuing
    #[arg(long, global = true)]
    animation_timeout_ms: Option<u64>,
    /// Navigation timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Show the browser window
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    headful: bool,
}

impl SessionArgs {
    fn to_config(&self) -> SessionConfig {
        let mut config = SessionConfig::default();
        if let Some(path) = &self.chrome {
            config.chrome_path = Some(path.clone());
        }
        if let Some(ms) = self.font_timeout_ms {
            config.font_timeout_ms = ms;
        }
        if let Some(ms) = self.animation_timeout_ms {
            config.animation_timeout_ms = ms;
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        config.headless = !self.headful;
        config
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

/// Print a report as text or JSON; returns whether it passed
#[cfg(feature = "cdp")]
fn print_report<R>(report: &R, json: bool, passed: bool) -> anyhow::Result<bool>
where
    R: std::fmt::Display + serde::Serialize,
{
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    Ok(passed)
}

#[cfg(feature = "cdp")]
fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    use anyhow::Context;

    let config = cli.session.to_config();
    match cli.command {
        Commands::Convert {
            input,
            output,
            dump_snapshot,
        } => {
            let snapshot = slidesnap::convert_file(&input, &output, config)?;
            if let Some(path) = dump_snapshot {
                let json = serde_json::to_string_pretty(&snapshot)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("writing snapshot to {}", path.display()))?;
            }
            println!(
                "Converted {} -> {} ({} elements)",
                input.display(),
                output.display(),
                snapshot.units.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckOverflow(args) => {
            let report = slidesnap::check_overflow_file(&args.file, config)?;
            let passed = print_report(&report, args.json, report.passed())?;
            Ok(verdict(passed, args.strict))
        }
        Commands::CheckOverlap(args) => {
            let report = slidesnap::check_overlap_file(&args.file, config)?;
            let passed = print_report(&report, args.json, report.passed())?;
            Ok(verdict(passed, args.strict))
        }
    }
}

#[cfg(not(feature = "cdp"))]
fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let _ = (cli.command, cli.session.to_config());
    anyhow::bail!("slidesnap was built without the `cdp` feature; no browser backend is available")
}

#[cfg(feature = "cdp")]
fn verdict(passed: bool, strict: bool) -> ExitCode {
    if strict && !passed {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
