//! Interactive session: pick a file, extract it, browse and export the result.

use crate::clipboard::OscClipboard;
use crate::{create_spinner, paint};
use colored::Colorize;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use unsheet::present::{copy_to_clipboard, render_view, write_download, Session};
use unsheet::render::ViewOptions;
use unsheet::{ConversionService, Upload};

const PROMPT: &str = "unsheet> ";

const HELP: &str = "\
Commands:
  open <path>       choose a file
  extract           extract data from the chosen file
  tab <n|name>      show another sheet
  json              show or hide the raw JSON
  show              redraw the current view
  download [dir]    save the JSON next to the result name
  copy              copy the JSON to the clipboard
  help              show this help
  quit              leave";

#[derive(Debug, PartialEq)]
enum Command {
    Open(PathBuf),
    Extract,
    Tab(String),
    Json,
    Show,
    Download(Option<PathBuf>),
    Copy,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "open" | "o" if !rest.is_empty() => Command::Open(PathBuf::from(rest)),
        "open" | "o" => return Err("usage: open <path>".to_string()),
        "extract" | "x" => Command::Extract,
        "tab" | "t" if !rest.is_empty() => Command::Tab(rest.to_string()),
        "tab" | "t" => return Err("usage: tab <n|name>".to_string()),
        "json" | "j" => Command::Json,
        "show" | "s" => Command::Show,
        "download" | "d" => Command::Download((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "copy" | "c" => Command::Copy,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(command))
}

/// Run the session on the terminal, optionally choosing a file first.
pub fn run(initial: Option<PathBuf>, options: ViewOptions) -> Result<(), Box<dyn Error>> {
    let mut session = Session::new(ConversionService::new());
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(path) = initial {
        open(&mut session, path, &mut out, &options)?;
    } else {
        writeln!(out, "{}", HELP)?;
    }

    repl(&mut session, stdin.lock(), &mut out, &options)
}

fn repl<R: BufRead, W: Write>(
    session: &mut Session<ConversionService>,
    input: R,
    out: &mut W,
    options: &ViewOptions,
) -> Result<(), Box<dyn Error>> {
    write!(out, "{}", PROMPT)?;
    out.flush()?;

    for line in input.lines() {
        match parse_command(&line?) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(session, command, out, options)?,
            Ok(None) => {}
            Err(message) => writeln!(out, "{}", message.yellow())?,
        }
        write!(out, "{}", PROMPT)?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

fn execute<W: Write>(
    session: &mut Session<ConversionService>,
    command: Command,
    out: &mut W,
    options: &ViewOptions,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Open(path) => open(session, path, out, options)?,

        Command::Extract => {
            if !session.state().can_submit() {
                writeln!(out, "{}", "Choose a file first (open <path>)".yellow())?;
                return Ok(());
            }
            let pb = create_spinner("Processing...");
            session.submit();
            pb.finish_and_clear();
            draw(session, out, options)?;
        }

        Command::Tab(target) => {
            let Some(result) = session.state().result().filter(|r| r.is_success()) else {
                writeln!(out, "{}", "No extracted data yet".yellow())?;
                return Ok(());
            };
            let total = result.total_sheets();
            let found = match target.parse::<usize>() {
                Ok(n) if (1..=total).contains(&n) => {
                    session.select_tab(n - 1);
                    true
                }
                _ => session.select_sheet(&target),
            };
            if found {
                draw(session, out, options)?;
            } else {
                writeln!(out, "{} no sheet '{}'", "!".yellow().bold(), target)?;
            }
        }

        Command::Json => {
            session.toggle_raw_json();
            draw(session, out, options)?;
        }

        Command::Show => draw(session, out, options)?,

        Command::Download(dir) => match session.state().result().filter(|r| r.is_success()) {
            Some(result) => {
                let dir = dir.unwrap_or_else(|| PathBuf::from("."));
                let path = write_download(result, &dir)?;
                writeln!(out, "{} Saved {}", "✓".green().bold(), path.display())?;
            }
            None => writeln!(out, "{}", "No extracted data yet".yellow())?,
        },

        Command::Copy => match session.state().result().filter(|r| r.is_success()) {
            Some(result) => {
                let mut clipboard = OscClipboard::new(&mut *out);
                copy_to_clipboard(result, &mut clipboard)?;
                writeln!(out, "{} Copied JSON to clipboard", "✓".green().bold())?;
            }
            None => writeln!(out, "{}", "No extracted data yet".yellow())?,
        },

        Command::Help => writeln!(out, "{}", HELP)?,

        Command::Quit => {}
    }
    Ok(())
}

fn open<W: Write>(
    session: &mut Session<ConversionService>,
    path: PathBuf,
    out: &mut W,
    options: &ViewOptions,
) -> Result<(), Box<dyn Error>> {
    match Upload::from_path(&path) {
        Ok(upload) => {
            session.choose_file(upload);
            draw(session, out, options)?;
        }
        Err(e) => writeln!(out, "{}: {}", "Error".red().bold(), e)?,
    }
    Ok(())
}

fn draw<W: Write>(
    session: &Session<ConversionService>,
    out: &mut W,
    options: &ViewOptions,
) -> Result<(), Box<dyn Error>> {
    let view = render_view(session.state(), options)?;
    writeln!(out, "{}", paint(&view))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use unsheet::present::Phase;

    fn run_script(script: &str) -> (String, Session<ConversionService>) {
        let mut session = Session::new(ConversionService::new());
        let mut out = Vec::new();
        repl(
            &mut session,
            script.as_bytes(),
            &mut out,
            &ViewOptions::default(),
        )
        .unwrap();
        (String::from_utf8(out).unwrap(), session)
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(
            parse_command("open my file.xlsx"),
            Ok(Some(Command::Open(PathBuf::from("my file.xlsx"))))
        );
        assert_eq!(parse_command("x"), Ok(Some(Command::Extract)));
        assert_eq!(parse_command("tab Q3"), Ok(Some(Command::Tab("Q3".into()))));
        assert_eq!(parse_command("download"), Ok(Some(Command::Download(None))));
        assert!(parse_command("open").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn test_commands_need_a_result() {
        let (text, session) = run_script("extract\ntab 1\ncopy\nquit\n");
        assert!(text.contains("Choose a file first"));
        assert!(text.contains("No extracted data yet"));
        assert_eq!(session.state().phase(), Phase::Idle);
    }

    #[test]
    fn test_open_missing_file() {
        let (text, session) = run_script("open does/not/exist.csv\n");
        assert!(text.contains("Error"));
        assert_eq!(session.state().phase(), Phase::Idle);
    }

    #[test]
    fn test_unknown_command_keeps_going() {
        let (text, _) = run_script("nope\nhelp\n");
        assert!(text.contains("unknown command 'nope'"));
        assert!(text.contains("Commands:"));
    }
}
