use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Upload(PathBuf),
    Open(PathBuf),
    /// Empty term clears the search
    Search(String),
    Sort(String),
    Filter { column: String, min: f64, max: f64 },
    Enable(String),
    Disable(String),
    Apply,
    Clear,
    Stats,
    Page(usize),
    Next,
    Prev,
    Export(Option<PathBuf>),
    Show,
    /// Row number on the current page, starting at 1
    Cell { row: usize, column: String },
    Log,
    Help,
    Quit,
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("Usage: {}", usage);
    }
    Ok(rest)
}

fn parse_bound(token: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| anyhow!("Not a number: {}", token))
}

/// Parse a prompt line. Column names may contain spaces, so the column is
/// always the remainder of the line after any fixed arguments.
pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "upload" => Command::Upload(PathBuf::from(required(rest, "upload <file.xlsx>")?)),
        "open" => Command::Open(PathBuf::from(required(rest, "open <file.csv>")?)),
        "search" | "/" => Command::Search(rest.to_string()),
        "sort" => Command::Sort(required(rest, "sort <column>")?.to_string()),
        "filter" => {
            let usage = "filter <column> <min> <max>";
            let mut tokens = required(rest, usage)?.rsplitn(3, char::is_whitespace);
            let max = tokens.next().ok_or_else(|| anyhow!("Usage: {}", usage))?;
            let min = tokens.next().ok_or_else(|| anyhow!("Usage: {}", usage))?;
            let column = tokens
                .next()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| anyhow!("Usage: {}", usage))?;
            Command::Filter {
                column: column.to_string(),
                min: parse_bound(min)?,
                max: parse_bound(max)?,
            }
        }
        "enable" => Command::Enable(required(rest, "enable <column>")?.to_string()),
        "disable" => Command::Disable(required(rest, "disable <column>")?.to_string()),
        "apply" => Command::Apply,
        "clear" => Command::Clear,
        "stats" => Command::Stats,
        "page" => {
            let n = required(rest, "page <n>")?;
            Command::Page(n.parse().map_err(|_| anyhow!("Not a page number: {}", n))?)
        }
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "export" => Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "show" => Command::Show,
        "cell" => {
            let usage = "cell <row> <column>";
            let (row, column) = required(rest, usage)?
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("Usage: {}", usage))?;
            let row: usize = row.parse().map_err(|_| anyhow!("Not a row number: {}", row))?;
            if row == 0 {
                bail!("Rows are numbered from 1");
            }
            Command::Cell {
                row,
                column: column.trim().to_string(),
            }
        }
        "log" => Command::Log,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("Unknown command: {} (type 'help')", other),
    };

    Ok(command)
}
