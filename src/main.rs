use clap::{Parser, Subcommand};
use resize_in_place::config::BatchConfig;
use resize_in_place::imaging::{self, FailureKind, Filter, ResizeError, ResizeRequest, RustBackend};
use resize_in_place::output;
use resize_in_place::process::{self, BatchSummary};
use resize_in_place::scan::{self, FileList};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Which files to work on.
#[derive(clap::Args, Clone)]
struct SelectArgs {
    /// Image files or folders (folders are searched recursively)
    paths: Vec<PathBuf>,

    /// Drag-and-drop payload: `{a b.jpg} {c.png}`, file:// URIs, or plain paths
    #[arg(long, value_name = "DATA")]
    drop: Option<String>,
}

/// How to resize them.
#[derive(clap::Args, Clone)]
struct RequestArgs {
    /// Multiply both edges by this factor (0.1 to 3.0)
    #[arg(long, conflicts_with = "target")]
    scale: Option<f64>,

    /// Fit inside this preset box, e.g. 1024x1024 (see `presets`)
    #[arg(long, value_name = "WxH")]
    target: Option<String>,
}

#[derive(Parser)]
#[command(name = "resize-in-place")]
#[command(about = "Batch-resize images and overwrite the originals")]
#[command(long_about = "\
Batch-resize images and overwrite the originals

Two modes, one per batch:

  --scale F        multiply width and height by F (0.1 to 3.0)
  --target WxH     fit inside a preset box; the image keeps its aspect ratio
                   and is centered on a transparent canvas of exactly WxH
                   (formats without alpha get a black background)

Supported formats: jpg, jpeg, png, bmp, gif, webp. Each file keeps its name
and is re-encoded in the format its extension names. JPEG uses quality 95.

Originals are overwritten. There is no undo.

Exit status: 0 all files resized, 1 usage error, 2 some files failed.")]
#[command(version)]
struct Cli {
    /// More logging on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the target presets and the scale range
    Presets,
    /// Show accepted files, rejections, and what a resize would produce
    Inspect {
        #[command(flatten)]
        select: SelectArgs,
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Resize and overwrite files in place
    Apply {
        #[command(flatten)]
        select: SelectArgs,
        #[command(flatten)]
        request: RequestArgs,
        /// Resampling filter
        #[arg(long, value_enum, default_value_t = Filter::default())]
        filter: Filter,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
        /// Print a JSON report instead of progress lines
        #[arg(long)]
        json: bool,
    },
}

/// Machine-readable result of `apply --json`.
#[derive(Serialize)]
struct ApplyReport<'a> {
    config: &'a BatchConfig,
    skipped: Vec<Skipped>,
    summary: &'a BatchSummary,
}

#[derive(Serialize)]
struct Skipped {
    kind: FailureKind,
    message: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Presets => {
            output::print_presets();
            Ok(ExitCode::SUCCESS)
        }
        Command::Inspect { select, request } => {
            let plan_request = match (request.scale, request.target.as_deref()) {
                (None, None) => None,
                (scale, target) => Some(BatchConfig::from_flags(scale, target)?.request),
            };
            let (list, rejected) = select_files(&select);
            inspect(&list, plan_request.as_ref());
            if !rejected.is_empty() {
                println!();
                output::print_rejections(&rejected);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Apply {
            select,
            request,
            filter,
            yes,
            json,
        } => {
            let config = BatchConfig::from_flags(request.scale, request.target.as_deref())?
                .with_filter(filter);
            let (list, rejected) = select_files(&select);
            if !json {
                output::print_rejections(&rejected);
            }
            if list.is_empty() {
                return Err("no images to resize".into());
            }
            if !yes && !confirm(list.len(), &config.request)? {
                eprintln!("Cancelled, nothing was changed");
                return Ok(ExitCode::SUCCESS);
            }

            let handle =
                process::spawn_batch(RustBackend::new(), list.into_batch(), config.clone())?;
            for event in &handle.events {
                if !json {
                    for line in output::format_process_event(&event, &config.request) {
                        println!("{}", line);
                    }
                }
            }
            let summary = handle.join()?;

            if json {
                let report = ApplyReport {
                    config: &config,
                    skipped: rejected
                        .iter()
                        .map(|err| Skipped {
                            kind: err.kind(),
                            message: err.to_string(),
                        })
                        .collect(),
                    summary: &summary,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }

            Ok(if summary.has_failures() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}

/// Build the validated file list from positional paths and an optional drop payload.
fn select_files(select: &SelectArgs) -> (FileList, Vec<ResizeError>) {
    let mut candidates = scan::collect_from_paths(&select.paths);
    if let Some(data) = &select.drop {
        candidates.extend(scan::collect_from_paths(&scan::parse_drop_payload(data)));
    }
    let mut list = FileList::new();
    let rejected = list.extend(candidates);
    (list, rejected)
}

fn inspect(list: &FileList, request: Option<&ResizeRequest>) {
    let backend = RustBackend::new();
    for (i, path) in list.iter().enumerate() {
        let lines = match imaging::describe(&backend, path) {
            Err(err) => output::format_preview_error(i + 1, path, &err),
            Ok(descriptor) => match request {
                None => output::format_preview(i + 1, &descriptor, None),
                Some(request) => match imaging::plan(&descriptor, request) {
                    Ok(result) => {
                        output::format_preview(i + 1, &descriptor, Some((request, &result)))
                    }
                    Err(err) => output::format_preview_error(i + 1, path, &err),
                },
            },
        };
        for line in lines {
            println!("{}", line);
        }
    }
}

/// Ask before overwriting. Anything but `y`/`yes` declines.
fn confirm(count: usize, request: &ResizeRequest) -> std::io::Result<bool> {
    let noun = if count == 1 { "file" } else { "files" };
    eprint!("Overwrite {count} {noun} ({request})? This cannot be undone. [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
