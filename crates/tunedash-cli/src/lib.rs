//! Shared CLI definitions for tunedash.
//!
//! Used by the main application and by the build script (manpage).

use clap::Parser;
use std::path::Path;

/// Extensions offered by the upload file browser. Everything is parsed as
/// delimited text regardless of which of these the file carries.
pub const DATASET_EXTENSIONS: [&str; 4] = ["csv", "xls", "json", "txt"];

/// True when the path carries one of the extensions the upload browser lists.
pub fn is_dataset_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            DATASET_EXTENSIONS.iter().any(|e| *e == ext)
        })
        .unwrap_or(false)
}

/// Parse a delimiter argument: a single ASCII character, or the word "tab".
fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!(
                    "delimiter must be a single ASCII character or \"tab\", got {s:?}"
                )),
            }
        }
    }
}

/// Command-line arguments for tunedash
#[derive(Clone, Parser, Debug)]
#[command(
    name = "tunedash",
    version,
    about = "Music catalog analytics in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to a dataset to preload. The session still opens on the landing
    /// screen; the file is ready to Generate from the upload screen.
    #[arg(value_name = "PATH")]
    pub path: Option<std::path::PathBuf>,

    /// Field delimiter for parsing (single ASCII character, or "tab")
    #[arg(short = 'd', long = "delimiter", value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Treat the first row as data rather than a header
    #[arg(long = "no-header", action)]
    pub no_header: bool,

    /// Skip this many rows when reading a file
    #[arg(long = "skip-rows", value_name = "N")]
    pub skip_rows: Option<usize>,

    /// Skip this many raw lines before parsing begins
    #[arg(long = "skip-lines", value_name = "N")]
    pub skip_lines: Option<usize>,

    /// Try to parse string columns as dates (e.g. YYYY-MM-DD, ISO datetime). Default: true
    #[arg(long = "parse-dates", value_name = "BOOL", value_parser = clap::value_parser!(bool))]
    pub parse_dates: Option<bool>,

    /// Use this configuration file instead of the standard location
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Generate default configuration file at ~/.config/tunedash/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    /// Enable debug mode: on-screen diagnostics line and file logging
    #[arg(long = "debug", action)]
    pub debug: bool,
}
