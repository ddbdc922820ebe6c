//! Chart selection and data preparation for the Explore screen.
//!
//! Each chart declares the columns it needs; applicability is evaluated
//! independently per chart against the dataset's schema, in a fixed order.
//! Preparation turns the (already genre-filtered) frame into plain series,
//! bars, tiles, or ring segments for the widgets to draw. One mark per row;
//! nothing is grouped or summed here beyond what a hierarchy inherently
//! requires (sunburst ring totals).

use std::collections::HashMap;

use color_eyre::Result;
use polars::datatypes::{DataType, TimeUnit};
use polars::prelude::*;

use crate::dataset::{
    column_sum, COL_COUNTRY, COL_DATE, COL_GENRE, COL_LISTENERS, COL_PLAYS, COL_PLAYS_BY_SONG,
    COL_REVENUE, COL_TOP_SONGS,
};

/// The three aggregate numbers at the top of the Explore screen. A missing
/// column sums to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KpiSummary {
    pub revenue: f64,
    pub plays: f64,
    pub listeners: f64,
}

pub fn kpi_summary(df: &DataFrame) -> KpiSummary {
    KpiSummary {
        revenue: column_sum(df, COL_REVENUE),
        plays: column_sum(df, COL_PLAYS),
        listeners: column_sum(df, COL_LISTENERS),
    }
}

/// Every chart the Explore screen can show, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    PlaysBySong,
    RevenueByCountryMap,
    RevenueByCountryBar,
    PlaysVsListeners,
    RevenueOverTime,
    TopSongsByListeners,
    GenreTopSongs,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::PlaysBySong,
        ChartKind::RevenueByCountryMap,
        ChartKind::RevenueByCountryBar,
        ChartKind::PlaysVsListeners,
        ChartKind::RevenueOverTime,
        ChartKind::TopSongsByListeners,
        ChartKind::GenreTopSongs,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::PlaysBySong => "Plays by Song",
            ChartKind::RevenueByCountryMap => "Revenue by Country (map)",
            ChartKind::RevenueByCountryBar => "Revenue by Country",
            ChartKind::PlaysVsListeners => "Plays vs Listeners",
            ChartKind::RevenueOverTime => "Revenue Over Time",
            ChartKind::TopSongsByListeners => "Top Songs by Listeners",
            ChartKind::GenreTopSongs => "Genre & Top Songs",
        }
    }

    /// Columns that must all be present for the chart to render.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            ChartKind::PlaysBySong => &[COL_TOP_SONGS, COL_PLAYS_BY_SONG],
            ChartKind::RevenueByCountryMap => &[COL_COUNTRY, COL_REVENUE],
            ChartKind::RevenueByCountryBar => &[COL_COUNTRY, COL_REVENUE],
            ChartKind::PlaysVsListeners => &[COL_PLAYS_BY_SONG, COL_LISTENERS, COL_TOP_SONGS],
            ChartKind::RevenueOverTime => &[COL_DATE, COL_REVENUE],
            ChartKind::TopSongsByListeners => &[COL_TOP_SONGS, COL_LISTENERS],
            ChartKind::GenreTopSongs => &[COL_GENRE, COL_TOP_SONGS],
        }
    }

    /// One-line reading aid shown under the chart.
    pub fn description(self) -> &'static str {
        match self {
            ChartKind::PlaysBySong => "Play counts for each song in the current selection.",
            ChartKind::RevenueByCountryMap => {
                "Where revenue comes from, shaded low to high on a world map."
            }
            ChartKind::RevenueByCountryBar => "Revenue per country, one bar per row.",
            ChartKind::PlaysVsListeners => {
                "How plays relate to listener counts, one point per song row."
            }
            ChartKind::RevenueOverTime => "Revenue across time, in date order.",
            ChartKind::TopSongsByListeners => {
                "Listener share per song; larger tiles mean more listeners."
            }
            ChartKind::GenreTopSongs => {
                "Genres in the inner ring, their songs outside, sized by listeners."
            }
        }
    }
}

/// Charts whose required columns are all present, in presentation order.
pub fn applicable_charts(columns: &[String]) -> Vec<ChartKind> {
    ChartKind::ALL
        .into_iter()
        .filter(|kind| {
            kind.required_columns()
                .iter()
                .all(|required| columns.iter().any(|c| c == required))
        })
        .collect()
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Describes how x-axis numeric values map to temporal types for label
/// formatting. RowIndex is the fallback when the Date column is neither
/// temporal nor numeric; points then sit at their row positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XAxisKind {
    Numeric,
    Date,       // x = days since Unix epoch (f64)
    DatetimeUs, // x = microseconds since epoch
    DatetimeMs,
    DatetimeNs,
    Time, // x = nanoseconds since midnight
    RowIndex,
}

fn x_axis_kind(dtype: &DataType) -> XAxisKind {
    match dtype {
        DataType::Date => XAxisKind::Date,
        DataType::Datetime(unit, _) => match unit {
            TimeUnit::Nanoseconds => XAxisKind::DatetimeNs,
            TimeUnit::Microseconds => XAxisKind::DatetimeUs,
            TimeUnit::Milliseconds => XAxisKind::DatetimeMs,
        },
        DataType::Time => XAxisKind::Time,
        _ if is_numeric_type(dtype) => XAxisKind::Numeric,
        _ => XAxisKind::RowIndex,
    }
}

/// Labeled bars, one per row, in row order.
#[derive(Debug, Clone, Default)]
pub struct CategoryBars {
    pub bars: Vec<(String, f64)>,
}

/// Prepare label/value bars. Rows with a null or non-finite value are
/// dropped; a null label becomes an empty string.
pub fn prepare_category_bars(
    df: &DataFrame,
    label_column: &str,
    value_column: &str,
    limit: usize,
) -> Result<CategoryBars> {
    let df = df
        .clone()
        .lazy()
        .select([
            col(label_column).cast(DataType::String),
            col(value_column).cast(DataType::Float64),
        ])
        .drop_nulls(Some(cols([value_column])))
        .slice(0, limit as u32)
        .collect()?;

    let labels = df.column(label_column)?.as_materialized_series().clone();
    let labels = labels.str()?;
    let values = df.column(value_column)?.f64()?;

    let mut bars = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let value = values.get(i).unwrap_or(f64::NAN);
        if !value.is_finite() {
            continue;
        }
        let label = labels.get(i).unwrap_or("").to_string();
        bars.push((label, value));
    }

    Ok(CategoryBars { bars })
}

/// Scatter points grouped by label purely for coloring; every row stays its
/// own point.
#[derive(Debug, Clone)]
pub struct ScatterSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct ScatterData {
    pub series: Vec<ScatterSeries>,
}

impl ScatterData {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// Prepare the Plays vs Listeners scatter: x = plays per song, y =
/// listeners, grouped by song label in first-appearance order.
pub fn prepare_scatter(df: &DataFrame, limit: usize) -> Result<ScatterData> {
    let df = df
        .clone()
        .lazy()
        .select([
            col(COL_PLAYS_BY_SONG).cast(DataType::Float64),
            col(COL_LISTENERS).cast(DataType::Float64),
            col(COL_TOP_SONGS).cast(DataType::String),
        ])
        .drop_nulls(Some(cols([COL_PLAYS_BY_SONG, COL_LISTENERS])))
        .slice(0, limit as u32)
        .collect()?;

    let xs = df.column(COL_PLAYS_BY_SONG)?.f64()?;
    let ys = df.column(COL_LISTENERS)?.f64()?;
    let labels = df.column(COL_TOP_SONGS)?.as_materialized_series().clone();
    let labels = labels.str()?;

    let mut series: Vec<ScatterSeries> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();

    for i in 0..df.height() {
        let (x, y) = match (xs.get(i), ys.get(i)) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => (x, y),
            _ => continue,
        };
        let label = labels.get(i).unwrap_or("").to_string();
        let idx = *index_by_label.entry(label.clone()).or_insert_with(|| {
            series.push(ScatterSeries {
                label,
                points: Vec::new(),
            });
            series.len() - 1
        });
        series[idx].points.push((x, y));
    }

    Ok(ScatterData { series })
}

/// Revenue over time, sorted chronologically (except RowIndex, which keeps
/// row order).
#[derive(Debug, Clone)]
pub struct TimeSeries {
    pub points: Vec<(f64, f64)>,
    pub x_axis_kind: XAxisKind,
}

pub fn prepare_time_series(df: &DataFrame, limit: usize) -> Result<TimeSeries> {
    let x_dtype = df.column(COL_DATE)?.dtype().clone();
    let x_axis_kind = x_axis_kind(&x_dtype);

    if x_axis_kind == XAxisKind::RowIndex {
        // Unparsed date strings: plot revenue at row positions.
        let df = df
            .clone()
            .lazy()
            .select([col(COL_REVENUE).cast(DataType::Float64)])
            .drop_nulls(None)
            .slice(0, limit as u32)
            .collect()?;
        let ys = df.column(COL_REVENUE)?.f64()?;
        let points = (0..df.height())
            .filter_map(|i| {
                let y = ys.get(i)?;
                y.is_finite().then_some((i as f64, y))
            })
            .collect();
        return Ok(TimeSeries {
            points,
            x_axis_kind,
        });
    }

    // X expr: temporal types go through Int64 (ordinal), numeric straight to
    // Float64.
    let x_expr = match x_dtype {
        DataType::Datetime(_, _) | DataType::Date | DataType::Time => {
            col(COL_DATE).cast(DataType::Int64)
        }
        _ => col(COL_DATE).cast(DataType::Float64),
    };

    let df = df
        .clone()
        .lazy()
        .select([x_expr, col(COL_REVENUE).cast(DataType::Float64)])
        .drop_nulls(None)
        .slice(0, limit as u32)
        .collect()?;

    let x_series = df.column(COL_DATE)?;
    let x_f64 = match x_series.dtype() {
        DataType::Int64 => x_series.cast(&DataType::Float64)?,
        _ => x_series.clone(),
    };
    let x_f64 = x_f64.f64()?;
    let ys = df.column(COL_REVENUE)?.f64()?;

    let mut points: Vec<(f64, f64)> = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let (Some(x), Some(y)) = (x_f64.get(i), ys.get(i)) else {
            continue;
        };
        if x.is_finite() && y.is_finite() {
            points.push((x, y));
        }
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(TimeSeries {
        points,
        x_axis_kind,
    })
}

/// One tile per row; rows with missing or non-positive sizes are dropped.
#[derive(Debug, Clone, Default)]
pub struct TreemapData {
    pub tiles: Vec<(String, f64)>,
}

pub fn prepare_treemap(df: &DataFrame, limit: usize) -> Result<TreemapData> {
    let bars = prepare_category_bars(df, COL_TOP_SONGS, COL_LISTENERS, limit)?;
    let tiles = bars
        .bars
        .into_iter()
        .filter(|(_, size)| *size > 0.0)
        .collect();
    Ok(TreemapData { tiles })
}

/// A genre ring segment and the songs nested within its angular span.
#[derive(Debug, Clone)]
pub struct SunburstGenre {
    pub name: String,
    pub total: f64,
    pub songs: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct SunburstData {
    pub genres: Vec<SunburstGenre>,
    pub total: f64,
}

impl SunburstData {
    pub fn is_empty(&self) -> bool {
        self.total <= 0.0 || self.genres.is_empty()
    }
}

/// Prepare the Genre → Top Songs hierarchy. Segment sizes come from
/// Listeners when that column exists (rows with a null size are dropped);
/// otherwise every row weighs 1. Duplicate genre/song paths merge, which is
/// what a hierarchy requires: a ring segment per distinct path, sized by its
/// rows together.
pub fn prepare_sunburst(df: &DataFrame, limit: usize) -> Result<SunburstData> {
    let has_listeners = df.column(COL_LISTENERS).is_ok();

    let mut select_exprs = vec![
        col(COL_GENRE).cast(DataType::String),
        col(COL_TOP_SONGS).cast(DataType::String),
    ];
    if has_listeners {
        select_exprs.push(col(COL_LISTENERS).cast(DataType::Float64));
    }

    let df = df
        .clone()
        .lazy()
        .select(select_exprs)
        .drop_nulls(None)
        .slice(0, limit as u32)
        .collect()?;

    let genres = df.column(COL_GENRE)?.as_materialized_series().clone();
    let genres = genres.str()?;
    let songs = df.column(COL_TOP_SONGS)?.as_materialized_series().clone();
    let songs = songs.str()?;
    let weights = if has_listeners {
        Some(df.column(COL_LISTENERS)?.f64()?)
    } else {
        None
    };

    let mut data = SunburstData::default();
    let mut genre_index: HashMap<String, usize> = HashMap::new();
    let mut song_index: HashMap<(usize, String), usize> = HashMap::new();

    for i in 0..df.height() {
        let (Some(genre), Some(song)) = (genres.get(i), songs.get(i)) else {
            continue;
        };
        let weight = match &weights {
            Some(ws) => match ws.get(i) {
                Some(w) if w.is_finite() && w > 0.0 => w,
                _ => continue,
            },
            None => 1.0,
        };

        let gi = *genre_index.entry(genre.to_string()).or_insert_with(|| {
            data.genres.push(SunburstGenre {
                name: genre.to_string(),
                total: 0.0,
                songs: Vec::new(),
            });
            data.genres.len() - 1
        });
        let si = *song_index
            .entry((gi, song.to_string()))
            .or_insert_with(|| {
                data.genres[gi].songs.push((song.to_string(), 0.0));
                data.genres[gi].songs.len() - 1
            });

        data.genres[gi].songs[si].1 += weight;
        data.genres[gi].total += weight;
        data.total += weight;
    }

    Ok(data)
}

/// Country/revenue rows for the choropleth, plus the value range the color
/// scale quantizes over.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    pub rows: Vec<(String, f64)>,
    pub min: f64,
    pub max: f64,
}

pub fn prepare_map(df: &DataFrame, limit: usize) -> Result<MapData> {
    let bars = prepare_category_bars(df, COL_COUNTRY, COL_REVENUE, limit)?;
    let rows: Vec<(String, f64)> = bars.bars;
    if rows.is_empty() {
        return Ok(MapData::default());
    }

    let (min, max) = rows.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)),
    );

    Ok(MapData { rows, min, max })
}

/// Quantize `value` into `buckets` steps between `min` and `max`. A
/// degenerate range maps everything to the top bucket.
pub fn scale_bucket(value: f64, min: f64, max: f64, buckets: usize) -> usize {
    debug_assert!(buckets > 0);
    if !(max > min) {
        return buckets - 1;
    }
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
    ((t * buckets as f64) as usize).min(buckets - 1)
}
