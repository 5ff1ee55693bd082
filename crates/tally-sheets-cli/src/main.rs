//! Tally CLI - drive a sheet from a line-oriented command script

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tally_sheets::Sheet;

#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about = "In-process spreadsheet engine driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command script against a fresh sheet and print the value grid
    Run {
        /// Script file; one command per line (set/clear/value/text/size/values/texts)
        input: PathBuf,

        /// Print the text grid instead of the value grid at the end
        #[arg(short, long)]
        texts: bool,
    },

    /// Read commands interactively from stdin
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { input, texts } => run_script(&input, texts),
        Commands::Repl => repl(),
    }
}

fn run_script(input: &PathBuf, texts: bool) -> Result<()> {
    let script = fs::read_to_string(input)
        .with_context(|| format!("Failed to read script: {}", input.display()))?;

    let mut sheet = Sheet::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (lineno, line) in script.lines().enumerate() {
        apply_command(&mut sheet, line, &mut out)
            .with_context(|| format!("{}:{}: {}", input.display(), lineno + 1, line.trim()))?;
    }

    if texts {
        sheet.print_texts(&mut out)?;
    } else {
        sheet.print_values(&mut out)?;
    }

    Ok(())
}

fn repl() -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut sheet = Sheet::new();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let mut out = stdout.lock();
        // Keep going on bad commands; a REPL line error is not fatal
        if let Err(e) = apply_command(&mut sheet, &line, &mut out) {
            writeln!(out, "error: {e:#}")?;
        }
    }

    Ok(())
}

/// Apply one script command to the sheet
///
/// Commands:
/// - `set <addr> <text>` - set cell content (text may contain spaces)
/// - `clear <addr>`      - reset a cell to empty
/// - `value <addr>`      - print the evaluated value
/// - `text <addr>`       - print the stored text form
/// - `size`              - print the printable extent
/// - `values` / `texts`  - print the whole grid
/// - blank lines and `#` comments are skipped
fn apply_command(sheet: &mut Sheet, line: &str, out: &mut impl Write) -> Result<()> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim_start()),
        None => (line, ""),
    };

    match command {
        "set" => {
            let (addr, text) = match rest.split_once(char::is_whitespace) {
                Some((addr, text)) => (addr, text),
                None if !rest.is_empty() => (rest, ""),
                None => bail!("usage: set <addr> <text>"),
            };
            sheet.set_cell(addr, text)?;
        }
        "clear" => {
            if rest.is_empty() {
                bail!("usage: clear <addr>");
            }
            sheet.clear_cell(rest)?;
        }
        "value" => {
            if rest.is_empty() {
                bail!("usage: value <addr>");
            }
            writeln!(out, "{}", sheet.value(rest)?)?;
        }
        "text" => {
            if rest.is_empty() {
                bail!("usage: text <addr>");
            }
            writeln!(out, "{}", sheet.text(rest)?)?;
        }
        "size" => {
            writeln!(out, "{}", sheet.printable_size())?;
        }
        "values" => {
            sheet.print_values(out)?;
        }
        "texts" => {
            sheet.print_texts(out)?;
        }
        other => bail!("unknown command '{other}'"),
    }

    Ok(())
}
