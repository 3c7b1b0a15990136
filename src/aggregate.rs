use std::collections::HashMap;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::Serialize;
use tracing::debug;

use crate::dataset::{Column, Dataset};

/// Column a [`SummaryTable`] is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupBy {
    State,
    Community,
    IncomeBucket,
    HouseholdSize,
    PctUrban,
}

impl GroupBy {
    pub fn name(&self) -> &'static str {
        match self {
            GroupBy::State => "state",
            GroupBy::Community => "communityName",
            GroupBy::IncomeBucket => "medFamInc",
            GroupBy::HouseholdSize => "householdsize",
            GroupBy::PctUrban => "pctUrban",
        }
    }

    /// Whether keys are numbers, and so usable as a line chart's x axis.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            GroupBy::IncomeBucket | GroupBy::HouseholdSize | GroupBy::PctUrban
        )
    }

    fn key(&self, dataset: &Dataset, index: usize) -> GroupKey {
        let record = &dataset.records()[index];
        match self {
            GroupBy::State => GroupKey::Text(record.state.clone()),
            GroupBy::Community => GroupKey::Text(record.community_name.clone()),
            GroupBy::IncomeBucket => GroupKey::number(dataset.income_bucket_at(index)),
            GroupBy::HouseholdSize => GroupKey::number(record.household_size),
            GroupBy::PctUrban => GroupKey::number(record.pct_urban),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Text(String),
    Number(OrderedFloat<f64>),
}

impl GroupKey {
    pub fn text(value: impl Into<String>) -> Self {
        GroupKey::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        GroupKey::Number(OrderedFloat(value))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GroupKey::Number(n) => Some(n.into_inner()),
            GroupKey::Text(_) => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GroupKey::Text(s) => write!(f, "{}", s),
            GroupKey::Number(n) => write!(f, "{}", n.into_inner()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Reduction {
    Sum,
    Mean,
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reduction::Sum => write!(f, "sum"),
            Reduction::Mean => write!(f, "mean"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Measure {
    pub column: Column,
    pub reduction: Reduction,
}

impl Measure {
    pub const fn sum(column: Column) -> Self {
        Measure {
            column,
            reduction: Reduction::Sum,
        }
    }

    pub const fn mean(column: Column) -> Self {
        Measure {
            column,
            reduction: Reduction::Mean,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub key: GroupKey,
    /// Rows of the dataset that fell into this group.
    pub count: usize,
    /// One reduced value per measure, in measure order.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct SummaryTable {
    group_by: GroupBy,
    measures: Vec<Measure>,
    rows: Vec<SummaryRow>,
    index: HashMap<GroupKey, usize>,
}

impl SummaryTable {
    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    /// Rows in first-appearance order of their key.
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Rows in ascending key order.
    pub fn sorted(&self) -> Vec<&SummaryRow> {
        let mut rows: Vec<&SummaryRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&SummaryRow> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    pub fn value(&self, key: &GroupKey, measure: Measure) -> Option<f64> {
        let position = self.measures.iter().position(|m| *m == measure)?;
        self.get(key).map(|row| row.values[position])
    }
}

#[derive(Clone, Copy, Default)]
struct Accumulator {
    total: f64,
    present: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        if !value.is_nan() {
            self.total += value;
            self.present += 1;
        }
    }

    fn finish(&self, reduction: Reduction) -> f64 {
        match reduction {
            Reduction::Sum => self.total,
            Reduction::Mean if self.present == 0 => f64::NAN,
            Reduction::Mean => self.total / self.present as f64,
        }
    }
}

/// Groups the dataset on `group_by` and reduces every measure per group.
///
/// Missing cells (NaN) are skipped by both reductions.
pub fn aggregate(dataset: &Dataset, group_by: GroupBy, measures: &[Measure]) -> SummaryTable {
    let mut index = HashMap::<GroupKey, usize>::new();
    let mut keys = Vec::<GroupKey>::new();
    let mut counts = Vec::<usize>::new();
    let mut accumulators = Vec::<Vec<Accumulator>>::new();

    for (i, record) in dataset.records().iter().enumerate() {
        let key = group_by.key(dataset, i);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = keys.len();
                index.insert(key.clone(), slot);
                keys.push(key);
                counts.push(0);
                accumulators.push(vec![Accumulator::default(); measures.len()]);
                slot
            }
        };
        counts[slot] += 1;
        for (acc, measure) in accumulators[slot].iter_mut().zip(measures) {
            acc.push(measure.column.value(record));
        }
    }

    let rows = keys
        .into_iter()
        .zip(counts)
        .zip(accumulators)
        .map(|((key, count), accs)| SummaryRow {
            key,
            count,
            values: accs
                .iter()
                .zip(measures)
                .map(|(acc, measure)| acc.finish(measure.reduction))
                .collect(),
        })
        .collect::<Vec<_>>();

    debug!(group_by = group_by.name(), groups = rows.len(), measures = measures.len(), "aggregated");
    SummaryTable {
        group_by,
        measures: measures.to_vec(),
        rows,
        index,
    }
}
