mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use table_diff::{ExportError, SheetParseError};

#[derive(Parser)]
#[command(name = "table-diff")]
#[command(about = "Compare two tabular data snapshots and show differences")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compare a base file against a candidate file")]
    Diff {
        #[arg(help = "Path to the base file (.xlsx or .csv)")]
        base: String,
        #[arg(help = "Path to the candidate file (.xlsx or .csv)")]
        candidate: String,
        #[arg(
            long,
            short,
            help = "Key column identifying records; rows match by position when omitted"
        )]
        key: Option<String>,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(
            long,
            value_name = "T",
            help = "Absolute numeric tolerance (default 1e-9)"
        )]
        tolerance: Option<f64>,
        #[arg(long, help = "Ignore ASCII case when comparing text")]
        case_insensitive: bool,
        #[arg(
            long,
            value_name = "PATH",
            help = "Write a workbook report with changed cells highlighted"
        )]
        export: Option<String>,
        #[arg(long, short, help = "Quiet mode: only show the summary")]
        quiet: bool,
        #[arg(long, short, help = "Verbose mode: show full changed rows")]
        verbose: bool,
    },
    #[command(about = "Show information about a file")]
    Info {
        #[arg(help = "Path to the file (.xlsx or .csv)")]
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Diff {
            base,
            candidate,
            key,
            format,
            tolerance,
            case_insensitive,
            export,
            quiet,
            verbose,
        } => commands::diff::run(
            &base,
            &candidate,
            key,
            format,
            tolerance,
            case_insensitive,
            export,
            quiet,
            verbose,
        ),
        Commands::Info { path } => commands::info::run(&path),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    if is_internal_error(err) {
        ExitCode::from(3)
    } else {
        ExitCode::from(2)
    }
}

fn is_internal_error(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.is::<SheetParseError>() || cause.is::<ExportError>())
}
