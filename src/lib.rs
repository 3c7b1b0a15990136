//! Crime statistics dashboard: per-state and per-community summaries of the
//! communities-and-crime dataset, charted in the terminal.

pub mod aggregate;
pub mod app;
pub mod catalog;
pub mod chart;
pub mod config;
pub mod csv_reader;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod reactive;
pub mod ui;

pub use aggregate::{aggregate, GroupBy, GroupKey, Measure, Reduction, SummaryTable};
pub use chart::{ChartData, ChartKind, ChartSpec, Palette};
pub use dataset::{Column, Dataset};
pub use error::DashError;
pub use reactive::{Dashboard, Reactor, SelectorId, Selection};
