use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{aggregate, GroupKey, Measure, SummaryTable};
use crate::catalog::{field_chart, static_chart, ChartId, Source, CATALOG};
use crate::chart::ChartSpec;
use crate::dataset::Dataset;
use crate::error::DashError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorId {
    Community,
    State,
}

impl SelectorId {
    pub const ALL: [SelectorId; 2] = [SelectorId::Community, SelectorId::State];
}

impl fmt::Display for SelectorId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SelectorId::Community => write!(f, "community"),
            SelectorId::State => write!(f, "state"),
        }
    }
}

/// Current value of a selector, tagged with the selector it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    Community(String),
    State(String),
}

impl Selection {
    pub fn new(selector: SelectorId, key: impl Into<String>) -> Self {
        match selector {
            SelectorId::Community => Selection::Community(key.into()),
            SelectorId::State => Selection::State(key.into()),
        }
    }

    pub fn selector(&self) -> SelectorId {
        match self {
            Selection::Community(_) => SelectorId::Community,
            Selection::State(_) => SelectorId::State,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Selection::Community(key) | Selection::State(key) => key,
        }
    }
}

const COMMUNITY_CHARTS: &[ChartId] = &[ChartId::CommunityRace, ChartId::CommunityCrimes];
const STATE_CHARTS: &[ChartId] = &[ChartId::StateCrimes, ChartId::StateRace];

/// Charts recomputed when `selector` changes.
pub fn bindings(selector: SelectorId) -> &'static [ChartId] {
    match selector {
        SelectorId::Community => COMMUNITY_CHARTS,
        SelectorId::State => STATE_CHARTS,
    }
}

/// Recomputes selector-bound charts from the shared dataset.
///
/// Summary tables the group charts read are built once in [`Reactor::new`];
/// [`Reactor::update`] only looks up a row and lays it out.
pub struct Reactor<'a> {
    dataset: &'a Dataset,
    tables: HashMap<ChartId, SummaryTable>,
}

impl<'a> Reactor<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        let mut tables = HashMap::new();
        for def in CATALOG {
            if let Source::GroupFields {
                group_by,
                reduction,
                fields,
                ..
            } = def.source
            {
                let measures: Vec<Measure> = fields
                    .iter()
                    .map(|f| Measure {
                        column: f.column,
                        reduction,
                    })
                    .collect();
                tables.insert(def.id, aggregate(dataset, group_by, &measures));
            }
        }
        Reactor { dataset, tables }
    }

    /// Same chart and selection always produce the same spec.
    pub fn update(&self, chart: ChartId, selection: &Selection) -> Result<ChartSpec, DashError> {
        let def = chart.def();
        let selector = def.selector().ok_or(DashError::NotReactive(chart))?;
        if selector != selection.selector() {
            return Err(DashError::SelectorMismatch {
                chart,
                selector: selection.selector(),
            });
        }
        let key = selection.key();
        let not_found = || DashError::NotFound {
            selector,
            key: key.to_string(),
        };

        let data = match def.source {
            Source::RecordFields { fields, kind } => {
                let record = self.dataset.find_community(key).ok_or_else(not_found)?;
                let values = fields.iter().map(|f| f.column.value(record)).collect();
                field_chart(kind, fields, values, key)
            }
            Source::GroupFields { fields, kind, .. } => {
                let table = self.tables.get(&chart).ok_or(DashError::NotReactive(chart))?;
                let row = table.get(&GroupKey::text(key)).ok_or_else(not_found)?;
                field_chart(kind, fields, row.values.clone(), key)
            }
            Source::Summary { .. } | Source::Relation { .. } => {
                return Err(DashError::NotReactive(chart))
            }
        };
        debug!(chart = %chart, selection = key, "chart updated");
        Ok(def.spec(def.title_for(key), data))
    }
}

/// Everything the presentation layer binds to: charts rendered at load and
/// the reactor behind the selectors.
pub struct Dashboard<'a> {
    dataset: &'a Dataset,
    static_charts: Vec<ChartSpec>,
    reactor: Reactor<'a>,
}

impl<'a> Dashboard<'a> {
    pub fn build(dataset: &'a Dataset) -> Self {
        let static_charts: Vec<ChartSpec> =
            CATALOG.iter().filter_map(|def| static_chart(def, dataset)).collect();
        let reactor = Reactor::new(dataset);
        info!(
            static_charts = static_charts.len(),
            reactive_charts = CATALOG.len() - static_charts.len(),
            "dashboard built"
        );
        Dashboard {
            dataset,
            static_charts,
            reactor,
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn static_charts(&self) -> &[ChartSpec] {
        &self.static_charts
    }

    pub fn reactor(&self) -> &Reactor<'a> {
        &self.reactor
    }

    /// Selector options in first-appearance order.
    pub fn options(&self, selector: SelectorId) -> Vec<String> {
        match selector {
            SelectorId::Community => self.dataset.communities(),
            SelectorId::State => self.dataset.states(),
        }
    }

    /// First key of the selector, taken from the first record.
    pub fn default_selection(&self, selector: SelectorId) -> Selection {
        let first = &self.dataset.records()[0];
        match selector {
            SelectorId::Community => Selection::Community(first.community_name.clone()),
            SelectorId::State => Selection::State(first.state.clone()),
        }
    }

    /// Recomputes every chart bound to the selection's selector.
    pub fn update_all(&self, selection: &Selection) -> Vec<(ChartId, Result<ChartSpec, DashError>)> {
        bindings(selection.selector())
            .iter()
            .map(|&chart| (chart, self.reactor.update(chart, selection)))
            .collect()
    }
}
