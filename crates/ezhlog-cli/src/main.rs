use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;

use ezhlog_core::{DecodeError, DumpReport, LayoutId, SERIAL_BAUD, decode_dump_file};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("EZHLOG_BUILD_COMMIT"),
    ", ",
    env!("EZHLOG_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "ezhlog")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline decoder for EZH environmental logger dumps (firmware v1-v4).",
    long_about = None,
    after_help = "Examples:\n  ezhlog dump decode session.ezh --layout v1 -o report.json\n  ezhlog dump decode session.ezh --layout v4 --stdout --pretty\n  ezhlog dump decode capture.bin --layout v2 -o report.json --summary"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on logger dump files (offline-first).
    Dump {
        #[command(subcommand)]
        command: DumpCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DumpCommands {
    /// Decode a dump into a versioned JSON report of normalized records.
    #[command(
        after_help = "Examples:\n  ezhlog dump decode session.ezh --layout v1 -o report.json\n  ezhlog dump decode session.ezh --layout v4 --stdout --pretty"
    )]
    Decode {
        /// Path to an .ezh or .bin dump file
        input: PathBuf,

        /// Firmware revision the dump was produced under (v1..v4)
        #[arg(long, value_parser = parse_layout)]
        layout: Option<LayoutId>,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if the dump decoded incompletely
        #[arg(long)]
        strict: bool,

        /// Print a session summary after decoding
        #[arg(long)]
        summary: bool,
    },
}

fn parse_layout(value: &str) -> Result<LayoutId, String> {
    value.parse::<LayoutId>().map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dump { command } => match command {
            DumpCommands::Decode {
                input,
                layout,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                summary,
            } => cmd_dump_decode(
                input, layout, report, stdout, pretty, compact, quiet, strict, summary,
            ),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn cmd_dump_decode(
    input: PathBuf,
    layout: Option<LayoutId>,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    summary: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        let report_abs = report_path
            .parent()
            .map(|parent| {
                if parent.as_os_str().is_empty() {
                    fs::canonicalize(".")
                } else {
                    fs::canonicalize(parent)
                }
            })
            .transpose()
            .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
        if let Some(report_dir) = report_abs {
            let report_target = report_dir.join(
                report_path
                    .file_name()
                    .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
            );
            if report_target == input_abs {
                return Err(CliError::new(
                    format!(
                        "report path must differ from input: {}",
                        report_path.display()
                    ),
                    Some("choose a different output path".to_string()),
                ));
            }
        }
    }

    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;

    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use an .ezh or .bin dump file".to_string()),
        ));
    }

    let rep = decode_dump_file(&resolved_input, layout).map_err(decode_error_to_cli)?;
    let json = serialize_report(&rep, pretty, compact)?;

    if stdout {
        print!("{}", json);
        if summary && !quiet {
            print_summary(&rep);
        }
        return finish(&rep, quiet, strict, None);
    }

    let report = report.expect("report required when not using stdout");
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if summary && !quiet {
        print_summary(&rep);
    }
    finish(&rep, quiet, strict, Some(&report))
}

fn finish(
    rep: &DumpReport,
    quiet: bool,
    strict: bool,
    written: Option<&PathBuf>,
) -> Result<(), CliError> {
    if !quiet {
        if let Some(error) = rep.error.as_ref() {
            eprintln!("warning: {}", error);
        }
        if let Some(path) = written {
            eprintln!("OK: report written -> {}", path.display());
        }
    }
    if strict {
        if let Some(error) = rep.error.as_ref() {
            return Err(CliError::new(
                format!("dump incomplete: {}", error),
                Some("re-dump the session, or check the --layout choice".to_string()),
            ));
        }
    }
    Ok(())
}

fn decode_error_to_cli(err: DecodeError) -> CliError {
    let hint = match &err {
        DecodeError::Unresolved(_) => Some(format!(
            "pass --layout v1|v2|v3|v4; the revision is printed on the logger's serial banner at {} baud",
            SERIAL_BAUD
        )),
        DecodeError::TruncatedInput { .. } => Some(
            "the dump ends before a full header; check the capture or the --layout choice"
                .to_string(),
        ),
        DecodeError::Source { .. } => None,
    };
    CliError::new(format!("decode failed: {}", err), hint)
}

fn serialize_report(rep: &DumpReport, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_summary(rep: &DumpReport) {
    let session = &rep.session;
    eprintln!(
        "Session: layout {}, {}/{} records decoded",
        session.layout, rep.records_decoded, session.declared_records
    );
    match (session.rtc_time.as_deref(), session.rtc_seconds) {
        (Some(time), _) => eprintln!("RTC: {} (flags 0x{:04X})", time, session.flags),
        (None, Some(secs)) => eprintln!(
            "RTC: {}s since epoch, not validated (flags 0x{:04X})",
            secs, session.flags
        ),
        (None, None) => eprintln!("RTC: none (flags 0x{:04X})", session.flags),
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use an .ezh or .bin dump file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "ezh" && ext != "bin" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected an .ezh or .bin dump file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .ezh or .bin".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single dump file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches.iter().take(3).collect::<Vec<_>>();
        if !listed.is_empty() {
            let mut details = String::new();
            details.push_str("; matches: ");
            details.push_str(
                &listed
                    .into_iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            if matches.len() > 3 {
                details.push_str(", ...");
            }
            message.push_str(&details);
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
