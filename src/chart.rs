use serde::Serialize;

use crate::catalog::ChartId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Histogram,
    Line,
    Pie,
}

/// Background and font colors of a chart, as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Palette {
    Teal,
    Crimson,
    Midnight,
}

impl Palette {
    pub fn paper_bg(&self) -> &'static str {
        match self {
            Palette::Teal => "#008B92",
            Palette::Crimson => "#D01120",
            Palette::Midnight => "#111111",
        }
    }

    pub fn plot_bg(&self) -> &'static str {
        match self {
            Palette::Teal => "#B7D5FE",
            Palette::Crimson => "#E7C5C6",
            Palette::Midnight => "#111111",
        }
    }

    pub fn font(&self) -> &'static str {
        match self {
            Palette::Teal | Palette::Crimson => "#FFFFFF",
            Palette::Midnight => "#7FDBFF",
        }
    }
}

/// Parses `#RRGGBB`.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartData {
    Histogram { x: Vec<String>, series: Vec<Series> },
    Line { x: Vec<f64>, series: Vec<Series> },
    Pie { names: Vec<String>, values: Vec<f64> },
}

impl ChartData {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::Histogram { .. } => ChartKind::Histogram,
            ChartData::Line { .. } => ChartKind::Line,
            ChartData::Pie { .. } => ChartKind::Pie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: ChartId,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub x_range: Option<(f64, f64)>,
    pub palette: Palette,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        self.data.kind()
    }
}
