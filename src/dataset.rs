use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use color_eyre::Result;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::config::AppConfig;
use tunedash_cli::Args;

/// Column names every feature keys off. All of them are optional in the
/// data; a chart is skipped when a column it needs is absent.
pub const COL_GENRE: &str = "Genre";
pub const COL_REVENUE: &str = "Revenue";
pub const COL_PLAYS: &str = "Plays";
pub const COL_LISTENERS: &str = "Listeners";
pub const COL_TOP_SONGS: &str = "Top Songs";
pub const COL_PLAYS_BY_SONG: &str = "Plays by Song";
pub const COL_COUNTRY: &str = "Country";
pub const COL_DATE: &str = "Date";

/// Sentinel genre-filter entry that applies no restriction.
pub const GENRE_ALL: &str = "All";

/// Options controlling how a dataset file is parsed.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub skip_rows: Option<usize>,
    pub skip_lines: Option<usize>,
    pub parse_dates: bool,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self {
            parse_dates: true,
            ..Default::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_has_header(mut self, has_header: Option<bool>) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: Option<usize>) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_skip_lines(mut self, skip_lines: Option<usize>) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    pub fn with_parse_dates(mut self, parse_dates: bool) -> Self {
        self.parse_dates = parse_dates;
        self
    }

    /// Build options from CLI arguments layered over config values.
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let file_loading = &config.file_loading;
        Self {
            delimiter: args.delimiter.or_else(|| file_loading.delimiter_byte()),
            has_header: if args.no_header {
                Some(false)
            } else {
                file_loading.has_header
            },
            skip_rows: args.skip_rows.or(file_loading.skip_rows),
            skip_lines: args.skip_lines.or(file_loading.skip_lines),
            parse_dates: args
                .parse_dates
                .or(file_loading.parse_dates)
                .unwrap_or(true),
        }
    }
}

/// The single in-memory table for the session. Replaced wholesale on each
/// upload; never merged.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub df: DataFrame,
    pub columns: Vec<String>,
    pub path: PathBuf,
}

impl Dataset {
    /// Parse a file as delimited text, whatever its extension says.
    pub fn load(path: &Path, options: &OpenOptions) -> Result<Self> {
        let pl_path = PlPath::Local(Arc::from(path));
        let mut reader = LazyCsvReader::new(pl_path);
        if let Some(delimiter) = options.delimiter {
            reader = reader.with_separator(delimiter);
        }
        if let Some(skip_lines) = options.skip_lines {
            reader = reader.with_skip_lines(skip_lines);
        }
        if let Some(skip_rows) = options.skip_rows {
            reader = reader.with_skip_rows(skip_rows);
        }
        if let Some(has_header) = options.has_header {
            reader = reader.with_has_header(has_header);
        }
        reader = reader.with_try_parse_dates(options.parse_dates);

        let lf = reader.finish()?;
        let schema = lf.clone().collect_schema()?;
        let columns: Vec<String> = schema.iter_names().map(|s| s.to_string()).collect();
        let df = lf.collect()?;

        debug!(
            path = %path.display(),
            rows = df.height(),
            cols = columns.len(),
            "dataset loaded"
        );

        Ok(Self {
            df,
            columns,
            path: path.to_path_buf(),
        })
    }

    /// Wrap an already-built frame. Used by tests.
    pub fn from_frame(df: DataFrame, path: PathBuf) -> Self {
        let columns = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        Self { df, columns, path }
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Sorted distinct non-empty genre values with the "All" sentinel
    /// prepended. Empty when the Genre column is absent.
    pub fn genre_values(&self) -> Vec<String> {
        if !self.has_column(COL_GENRE) {
            return Vec::new();
        }

        let mut distinct = BTreeSet::new();
        let series = match self.df.column(COL_GENRE) {
            Ok(col) => col.as_materialized_series().clone(),
            Err(_) => return Vec::new(),
        };
        let casted = match series.cast(&DataType::String) {
            Ok(s) => s,
            Err(e) => {
                warn!("genre column could not be read as strings: {e}");
                return Vec::new();
            }
        };
        if let Ok(ca) = casted.str() {
            for value in ca.iter().flatten() {
                if !value.is_empty() {
                    distinct.insert(value.to_string());
                }
            }
        }

        let mut values = Vec::with_capacity(distinct.len() + 1);
        values.push(GENRE_ALL.to_string());
        values.extend(distinct);
        values
    }

    /// The dataset restricted to rows whose Genre equals `genre`. "All" (or
    /// a missing Genre column) applies no restriction.
    pub fn filtered(&self, genre: &str) -> Result<DataFrame> {
        if genre == GENRE_ALL || !self.has_column(COL_GENRE) {
            return Ok(self.df.clone());
        }
        let filtered = self
            .df
            .clone()
            .lazy()
            .filter(col(COL_GENRE).eq(lit(genre)))
            .collect()?;
        Ok(filtered)
    }
}

/// Sum a column as f64. Missing columns, non-numeric content, and empty
/// frames all sum to zero rather than erroring.
pub fn column_sum(df: &DataFrame, name: &str) -> f64 {
    if df.column(name).is_err() {
        return 0.0;
    }
    let summed = df
        .clone()
        .lazy()
        .select([col(name).cast(DataType::Float64).sum()])
        .collect();
    match summed {
        Ok(out) => out
            .column(name)
            .ok()
            .and_then(|c| c.as_materialized_series().f64().ok().and_then(|ca| ca.get(0)))
            .unwrap_or(0.0),
        Err(e) => {
            warn!("failed to sum column {name:?}: {e}");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> Dataset {
        let df = df!(
            COL_GENRE => &[Some("Rock"), Some("Pop"), Some("Rock"), None, Some("Jazz")],
            COL_REVENUE => &[10.0, 20.0, 30.0, 5.0, 15.0],
            COL_PLAYS => &[100i64, 200, 300, 50, 150],
        )
        .unwrap();
        Dataset::from_frame(df, PathBuf::from("test.csv"))
    }

    #[test]
    fn test_genre_values_sorted_with_all_sentinel() {
        let ds = sample_dataset();
        assert_eq!(ds.genre_values(), vec!["All", "Jazz", "Pop", "Rock"]);
    }

    #[test]
    fn test_genre_values_empty_without_column() {
        let df = df!(COL_REVENUE => &[1.0, 2.0]).unwrap();
        let ds = Dataset::from_frame(df, PathBuf::from("test.csv"));
        assert!(ds.genre_values().is_empty());
    }

    #[test]
    fn test_filtered_restricts_rows() {
        let ds = sample_dataset();
        let rock = ds.filtered("Rock").unwrap();
        assert_eq!(rock.height(), 2);
        assert_eq!(column_sum(&rock, COL_REVENUE), 40.0);
    }

    #[test]
    fn test_filtered_all_is_identity_and_idempotent() {
        let ds = sample_dataset();
        let all_once = ds.filtered(GENRE_ALL).unwrap();
        assert_eq!(all_once.height(), ds.height());

        // Filtering the already-unrestricted frame again changes nothing
        let ds2 = Dataset::from_frame(all_once.clone(), ds.path.clone());
        let all_twice = ds2.filtered(GENRE_ALL).unwrap();
        assert_eq!(all_twice.height(), all_once.height());
        assert_eq!(
            column_sum(&all_twice, COL_REVENUE),
            column_sum(&all_once, COL_REVENUE)
        );
    }

    #[test]
    fn test_filtered_unknown_genre_yields_empty() {
        let ds = sample_dataset();
        let none = ds.filtered("Metal").unwrap();
        assert_eq!(none.height(), 0);
        assert_eq!(column_sum(&none, COL_REVENUE), 0.0);
    }

    #[test]
    fn test_column_sum() {
        let df = df!(COL_REVENUE => &[10i64, 20, 30]).unwrap();
        assert_eq!(column_sum(&df, COL_REVENUE), 60.0);
    }

    #[test]
    fn test_column_sum_missing_column() {
        let df = df!("Other" => &[1i64, 2]).unwrap();
        assert_eq!(column_sum(&df, COL_REVENUE), 0.0);
    }

    #[test]
    fn test_column_sum_ignores_nulls() {
        let df = df!(COL_REVENUE => &[Some(10.0), None, Some(30.0)]).unwrap();
        assert_eq!(column_sum(&df, COL_REVENUE), 40.0);
    }

    #[test]
    fn test_column_sum_non_numeric_is_zero() {
        let df = df!(COL_REVENUE => &["a", "b"]).unwrap();
        assert_eq!(column_sum(&df, COL_REVENUE), 0.0);
    }

    #[test]
    fn test_open_options_builder() {
        let opts = OpenOptions::new()
            .with_delimiter(Some(b';'))
            .with_has_header(Some(false))
            .with_skip_rows(Some(2));
        assert_eq!(opts.delimiter, Some(b';'));
        assert_eq!(opts.has_header, Some(false));
        assert_eq!(opts.skip_rows, Some(2));
        assert!(opts.parse_dates);
    }
}
