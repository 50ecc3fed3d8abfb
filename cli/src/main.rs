//! pdfstitch CLI - page-level PDF merging tool

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfstitch::{open_document, verify, InputReport, PageSelection, PdfVersion, Stitcher};

type CliResult = Result<(), Box<dyn StdError>>;

#[derive(Parser)]
#[command(name = "pdfstitch")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Merge PDF documents page by page", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    merge: MergeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge PDF files into one document
    Merge(MergeArgs),

    /// Show the object structure of PDF files
    Info {
        /// Input PDF files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that a file's cross-reference offsets are exact
    Verify {
        /// PDF file to check
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct MergeArgs {
    /// Input PDF files in merge order; append @PAGES to select pages (e.g. "a.pdf@1-3")
    #[arg(value_name = "FILE")]
    inputs: Vec<String>,

    /// Output file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Version to declare in the output header (default: highest input version)
    #[arg(long, value_name = "VERSION", env = "PDFSTITCH_PDF_VERSION", value_parser = parse_version)]
    pdf_version: Option<PdfVersion>,

    /// Write a document information dictionary
    #[arg(long)]
    info: bool,

    /// Copy attributes pages inherit from their page tree (MediaBox, Resources, ...)
    #[arg(long)]
    inherit: bool,

    /// Scan inputs one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Print the merge report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_version(s: &str) -> Result<PdfVersion, String> {
    PdfVersion::parse(s).ok_or_else(|| format!("'{}' is not a version like 1.7", s))
}

/// Split an input argument into a path and page selection.
///
/// The selection follows the last `@`; when that suffix is not a valid
/// selection the whole argument is taken as the path.
fn parse_input(arg: &str) -> (PathBuf, PageSelection) {
    if let Some((path, pages)) = arg.rsplit_once('@') {
        if !path.is_empty() {
            if let Ok(selection) = PageSelection::parse(pages) {
                return (PathBuf::from(path), selection);
            }
        }
    }
    (PathBuf::from(arg), PageSelection::All)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Merge(args)) => cmd_merge(&args),
        Some(Commands::Info { inputs, json }) => cmd_info(&inputs, json),
        Some(Commands::Verify { input, json }) => cmd_verify(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: merge if inputs are provided
            if cli.merge.inputs.is_empty() {
                println!("{}", "Usage: pdfstitch <FILE>... -o <OUTPUT>".yellow());
                println!("       pdfstitch --help for more information");
                Ok(())
            } else {
                cmd_merge(&cli.merge)
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(exit_code(e.as_ref()));
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn exit_code(err: &(dyn StdError + 'static)) -> i32 {
    err.downcast_ref::<pdfstitch::Error>()
        .map_or(1, pdfstitch::Error::exit_code)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn cmd_merge(args: &MergeArgs) -> CliResult {
    let output = args
        .output
        .as_deref()
        .ok_or("missing output file (use -o <FILE>)")?;
    if args.inputs.is_empty() {
        return Err(pdfstitch::Error::NoInputs.into());
    }

    let mut stitcher = Stitcher::new()
        .with_info(args.info)
        .inherit_attributes(args.inherit);
    if args.sequential {
        stitcher = stitcher.sequential();
    }
    if let Some(version) = args.pdf_version {
        stitcher = stitcher.with_version(version);
    }
    for arg in &args.inputs {
        let (path, selection) = parse_input(arg);
        stitcher = stitcher.input_pages(path, selection);
    }

    let pb = (!args.json).then(|| spinner(&format!("Merging {} files...", args.inputs.len())));
    let result = stitcher.merge_to(output);
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} ({} pages, {} objects, PDF {})",
        "Saved to".green(),
        output.display(),
        report.pages,
        report.objects,
        report.version
    );
    let last = report.inputs.len().saturating_sub(1);
    for (i, input) in report.inputs.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        println!(
            "  {} {}: {} pages, {} dependencies",
            branch.dimmed(),
            input.label,
            input.pages,
            input.dependencies
        );
    }
    if report.unresolved_count() > 0 {
        println!(
            "{} {} unresolved reference target(s) kept as-is",
            "Warning:".yellow(),
            report.unresolved_count()
        );
    }

    Ok(())
}

fn cmd_info(inputs: &[PathBuf], json: bool) -> CliResult {
    let mut reports = Vec::with_capacity(inputs.len());
    for (index, path) in inputs.iter().enumerate() {
        let doc = open_document(index, path)?;
        reports.push(InputReport::inspect(&doc));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!("{}", "Document Information".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}: {}", "File".bold(), report.label);
        match report.version {
            Some(version) => println!("{}: PDF {}", "Format".bold(), version),
            None => println!("{}: {}", "Format".bold(), "no header".yellow()),
        }
        println!("{}: {}", "Objects".bold(), report.objects);
        println!("{}: {}", "Pages".bold(), report.page_count());
        println!("{}: {}", "Dependencies".bold(), report.dependencies);
        if !report.unresolved.is_empty() {
            println!("{}: {:?}", "Unresolved".bold(), report.unresolved);
        }
        if report.stats.unterminated > 0 || report.stats.duplicates > 0 {
            println!(
                "{}: {} unterminated, {} duplicate ids",
                "Warnings".yellow().bold(),
                report.stats.unterminated,
                report.stats.duplicates
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_verify(input: &Path, json: bool) -> CliResult {
    let data = pdfstitch::read_input(0, input)?;
    let report = verify::check(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", "Cross-reference check".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}: {}", "xref offset".bold(), report.xref_offset);
        println!(
            "{}: {} ({} in use, {} free)",
            "Entries".bold(),
            report.entries,
            report.in_use,
            report.free
        );
        for mismatch in &report.mismatches {
            println!(
                "  {} object {} at offset {}",
                "✗".red(),
                mismatch.id,
                mismatch.offset
            );
        }
    }

    if !report.is_valid() {
        return Err(format!("{} is not consistent", input.display()).into());
    }
    if !json {
        println!("{}", "OK".green().bold());
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfstitch".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Page-level PDF merging tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pdfstitch".dimmed());
    println!("License: MIT");
}
