use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::csv_reader::Record;
use crate::error::DashError;

pub const INCOME_BUCKET_STEP: f64 = 1000.0;

/// Numeric columns of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    Population,
    HouseholdSize,
    MedFamInc,
    PctUrban,
    RacePctBlack,
    RacePctWhite,
    RacePctAsian,
    RacePctHisp,
    Murders,
    Rapes,
    Robberies,
    Assaults,
    Burglaries,
    Larcenies,
    AutoTheft,
    Arsons,
}

impl Column {
    pub const CRIMES: [Column; 8] = [
        Column::Murders,
        Column::Rapes,
        Column::Robberies,
        Column::Assaults,
        Column::Burglaries,
        Column::Larcenies,
        Column::AutoTheft,
        Column::Arsons,
    ];

    pub const RACES: [Column; 4] = [
        Column::RacePctBlack,
        Column::RacePctWhite,
        Column::RacePctAsian,
        Column::RacePctHisp,
    ];

    /// Header name in the source file.
    pub fn name(&self) -> &'static str {
        match self {
            Column::Population => "population",
            Column::HouseholdSize => "householdsize",
            Column::MedFamInc => "medFamInc",
            Column::PctUrban => "pctUrban",
            Column::RacePctBlack => "racepctblack",
            Column::RacePctWhite => "racePctWhite",
            Column::RacePctAsian => "racePctAsian",
            Column::RacePctHisp => "racePctHisp",
            Column::Murders => "murders",
            Column::Rapes => "rapes",
            Column::Robberies => "robberies",
            Column::Assaults => "assaults",
            Column::Burglaries => "burglaries",
            Column::Larcenies => "larcenies",
            Column::AutoTheft => "autoTheft",
            Column::Arsons => "arsons",
        }
    }

    pub fn value(&self, record: &Record) -> f64 {
        match self {
            Column::Population => record.population,
            Column::HouseholdSize => record.household_size,
            Column::MedFamInc => record.med_fam_inc,
            Column::PctUrban => record.pct_urban,
            Column::RacePctBlack => record.race_pct_black,
            Column::RacePctWhite => record.race_pct_white,
            Column::RacePctAsian => record.race_pct_asian,
            Column::RacePctHisp => record.race_pct_hisp,
            Column::Murders => record.murders,
            Column::Rapes => record.rapes,
            Column::Robberies => record.robberies,
            Column::Assaults => record.assaults,
            Column::Burglaries => record.burglaries,
            Column::Larcenies => record.larcenies,
            Column::AutoTheft => record.auto_theft,
            Column::Arsons => record.arsons,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Truncates an income to the nearest lower multiple of [`INCOME_BUCKET_STEP`].
pub fn income_bucket(income: f64) -> f64 {
    (income / INCOME_BUCKET_STEP).floor() * INCOME_BUCKET_STEP
}

/// The loaded rows, immutable after construction.
///
/// Income buckets are computed once here and shared by every income-keyed
/// aggregation.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<Record>,
    income_buckets: Vec<f64>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Result<Self, DashError> {
        if records.is_empty() {
            return Err(DashError::EmptyDataset);
        }
        let income_buckets = records.iter().map(|r| income_bucket(r.med_fam_inc)).collect();
        debug!(records = records.len(), "dataset constructed");
        Ok(Dataset {
            records,
            income_buckets,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn income_bucket_at(&self, index: usize) -> f64 {
        self.income_buckets[index]
    }

    /// Distinct community names in first-appearance order.
    pub fn communities(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.community_name.as_str()))
    }

    /// Distinct state names in first-appearance order.
    pub fn states(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.state.as_str()))
    }

    pub fn community_matches(&self, name: &str) -> usize {
        self.records.iter().filter(|r| r.community_name == name).count()
    }

    /// Looks up a community by name. When several rows share the name, the
    /// first one in dataset order wins.
    pub fn find_community(&self, name: &str) -> Option<&Record> {
        let found = self.records.iter().find(|r| r.community_name == name)?;
        let matches = self.community_matches(name);
        if matches > 1 {
            warn!(community = name, matches, "duplicate community name, using first row");
        }
        Some(found)
    }

    /// Records in ascending order of `column`; stable, NaN last.
    pub fn sorted_by(&self, column: Column) -> Vec<&Record> {
        let mut sorted: Vec<&Record> = self.records.iter().collect();
        sorted.sort_by(|a, b| nan_last(column.value(a), column.value(b)));
        sorted
    }
}

fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .filter(|n| seen.insert(*n))
        .map(|n| n.to_string())
        .collect()
}

fn nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}
