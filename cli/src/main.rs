//! unsheet CLI - spreadsheet extraction to JSON
//!
//! A command-line tool for extracting the sheets of XLSX, XLS, and CSV files
//! as JSON row records.

mod clipboard;
mod interactive;
mod logger;

use clap::{ArgAction, Parser, Subcommand};
use clipboard::OscClipboard;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use unsheet::present::{copy_to_clipboard, format_size, render_view, write_download, Session};
use unsheet::render::{JsonFormat, ViewOptions};
use unsheet::{ConversionResult, ConversionService, Upload};

/// Spreadsheet extraction to JSON
#[derive(Parser)]
#[command(
    name = "unsheet",
    author = "iyulab",
    version,
    about = "Extract spreadsheet data as JSON",
    long_about = "unsheet - Spreadsheet to JSON extraction tool.\n\n\
                  Reads XLSX, XLS, and CSV files and turns every sheet into\n\
                  header-keyed row records."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a spreadsheet to JSON
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// Declared MIME type (default: implied by the extension)
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Show the extracted sheets as tables
    Show {
        /// Input file path
        input: PathBuf,

        /// Sheet to show (default: the first)
        #[arg(long)]
        sheet: Option<String>,

        /// Maximum rows to print per table
        #[arg(long)]
        max_rows: Option<usize>,

        /// Also print the raw JSON
        #[arg(long)]
        raw_json: bool,
    },

    /// Save the JSON as <name>_extracted.json
    Export {
        /// Input file path
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Copy the JSON to the terminal clipboard
    Copy {
        /// Input file path
        input: PathBuf,
    },

    /// Show workbook information
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Start an interactive session
    #[command(visible_alias = "i")]
    Interactive {
        /// File to open first
        input: Option<PathBuf>,

        /// Maximum rows to print per table
        #[arg(long)]
        max_rows: Option<usize>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Json {
            input,
            output,
            compact,
            content_type,
        } => {
            let mut upload = Upload::from_path(&input)?;
            if let Some(content_type) = content_type {
                upload = upload.with_content_type(content_type);
            }
            let result = extract(&upload);

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = unsheet::render::to_json(&result, format)?;
            write_output(output.as_ref(), &json)?;

            ensure_success(&result)?;
            if let Some(path) = output {
                println!("{} Converted to JSON: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Show {
            input,
            sheet,
            max_rows,
            raw_json,
        } => {
            let mut session = Session::new(ConversionService::new());
            session.choose_file(Upload::from_path(&input)?);

            let pb = create_spinner("Processing...");
            session.submit();
            pb.finish_and_clear();

            if let Some(ref name) = sheet {
                if session.state().result().is_some_and(|r| r.is_success())
                    && !session.select_sheet(name)
                {
                    return Err(format!("Sheet not found: {}", name).into());
                }
            }
            if raw_json {
                session.toggle_raw_json();
            }

            let mut options = ViewOptions::default();
            if let Some(max) = max_rows {
                options = options.with_max_rows(max);
            }
            println!("{}", paint(&render_view(session.state(), &options)?));

            if let Some(result) = session.state().result() {
                ensure_success(result)?;
            }
        }

        Commands::Export { input, dir } => {
            let result = extract(&Upload::from_path(&input)?);
            ensure_success(&result)?;

            fs::create_dir_all(&dir)?;
            let path = write_download(&result, &dir)?;
            println!(
                "{} Saved {} sheet(s) to {}",
                "✓".green().bold(),
                result.total_sheets(),
                path.display()
            );
        }

        Commands::Copy { input } => {
            let result = extract(&Upload::from_path(&input)?);
            ensure_success(&result)?;

            let stdout = io::stdout();
            let mut clipboard = OscClipboard::new(stdout.lock());
            copy_to_clipboard(&result, &mut clipboard)?;
            eprintln!("{} Copied JSON to clipboard", "✓".green().bold());
        }

        Commands::Info { input } => print_info(&input)?,

        Commands::Interactive { input, max_rows } => {
            let mut options = ViewOptions::default();
            if let Some(max) = max_rows {
                options = options.with_max_rows(max);
            }
            interactive::run(input, options)?;
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn extract(upload: &Upload) -> ConversionResult {
    let pb = create_spinner("Processing...");
    let result = unsheet::convert(upload);
    pb.finish_and_clear();
    result
}

fn ensure_success(result: &ConversionResult) -> Result<(), Box<dyn std::error::Error>> {
    match result.error() {
        Some(message) => Err(message.into()),
        None => Ok(()),
    }
}

fn print_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let upload = Upload::from_path(input)?;
    let size = upload.len();
    let format = upload
        .content
        .as_deref()
        .map(unsheet::detect_format_from_bytes)
        .transpose()
        .ok()
        .flatten();

    let result = extract(&upload);
    ensure_success(&result)?;

    println!("{}", "Workbook Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "File".bold(), result.file_name());
    match format {
        Some(format) => println!("{}: {:?}", "Format".bold(), format),
        None => println!("{}: unknown", "Format".bold()),
    }
    println!("{}: {}", "Size".bold(), format_size(size));
    println!("{}: {}", "Sheets".bold(), result.total_sheets());
    println!("{}: {}", "Rows".bold(), result.total_rows());

    for sheet in result.sheets() {
        println!("\n{}", sheet.sheet_name().cyan().bold());
        println!("{}", "─".repeat(40));
        println!(
            "{}: {} rows × {} columns",
            "Size".bold(),
            sheet.row_count(),
            sheet.column_count()
        );
        if !sheet.headers().is_empty() {
            println!("{}: {}", "Headers".bold(), sheet.headers().join(", "));
        }
    }
    Ok(())
}

fn print_version() {
    println!("{} {}", "unsheet".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Spreadsheet extraction to JSON");
    println!();
    println!("Supported formats: XLSX, XLS, CSV");
    println!("Repository: https://github.com/iyulab/unsheet");
}

/// Color the banners and titles of a rendered view.
pub(crate) fn paint(view: &str) -> String {
    view.lines()
        .map(|line| {
            if line.starts_with("Successfully extracted") {
                line.green().bold().to_string()
            } else if line.starts_with("Error:") {
                line.red().bold().to_string()
            } else if line == "Upload Excel File" || line == "Raw JSON Output" {
                line.cyan().bold().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["unsheet", "info", "a.xlsx", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_paint_keeps_text() {
        colored::control::set_override(false);
        let view = "Upload Excel File\nError: bad file";
        assert_eq!(paint(view), view);
    }
}
