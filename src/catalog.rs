//! Every chart the dashboard shows, described as data.
//!
//! Static charts are rendered once from the dataset. Charts with a selector
//! are re-rendered by [`crate::reactive::Reactor`] whenever the selection
//! changes.

use std::fmt;

use serde::Serialize;

use crate::aggregate::{aggregate, GroupBy, Measure, Reduction};
use crate::chart::{ChartData, ChartKind, ChartSpec, Palette, Series};
use crate::dataset::{Column, Dataset};
use crate::reactive::SelectorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    AutoTheftsByState,
    BurglariesByPopulation,
    CrimesByIncome,
    LarceniesByHouseholdSize,
    AssaultsByUrbanization,
    CommunityRace,
    CommunityCrimes,
    StateCrimes,
    StateRace,
}

impl ChartId {
    pub fn name(&self) -> &'static str {
        match self {
            ChartId::AutoTheftsByState => "auto_thefts_by_state",
            ChartId::BurglariesByPopulation => "burglaries_by_population",
            ChartId::CrimesByIncome => "crimes_by_income",
            ChartId::LarceniesByHouseholdSize => "larcenies_by_household_size",
            ChartId::AssaultsByUrbanization => "assaults_by_urbanization",
            ChartId::CommunityRace => "community_race",
            ChartId::CommunityCrimes => "community_crimes",
            ChartId::StateCrimes => "state_crimes",
            ChartId::StateRace => "state_race",
        }
    }

    pub fn def(&self) -> &'static ChartDef {
        match self {
            ChartId::AutoTheftsByState => &AUTO_THEFTS_BY_STATE,
            ChartId::BurglariesByPopulation => &BURGLARIES_BY_POPULATION,
            ChartId::CrimesByIncome => &CRIMES_BY_INCOME,
            ChartId::LarceniesByHouseholdSize => &LARCENIES_BY_HOUSEHOLD_SIZE,
            ChartId::AssaultsByUrbanization => &ASSAULTS_BY_URBANIZATION,
            ChartId::CommunityRace => &COMMUNITY_RACE,
            ChartId::CommunityCrimes => &COMMUNITY_CRIMES,
            ChartId::StateCrimes => &STATE_CRIMES,
            ChartId::StateRace => &STATE_RACE,
        }
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A labelled column pulled out of a record or summary row.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub label: &'static str,
    pub column: Column,
}

const fn field(label: &'static str, column: Column) -> Field {
    Field { label, column }
}

pub const RACE_FIELDS: &[Field] = &[
    field("Black", Column::RacePctBlack),
    field("White", Column::RacePctWhite),
    field("Asian", Column::RacePctAsian),
    field("Hispanic", Column::RacePctHisp),
];

pub const CRIME_FIELDS: &[Field] = &[
    field("Murders", Column::Murders),
    field("Rapes", Column::Rapes),
    field("Robberies", Column::Robberies),
    field("Assaults", Column::Assaults),
    field("Burglaries", Column::Burglaries),
    field("Larcenies", Column::Larcenies),
    field("Auto thefts", Column::AutoTheft),
    field("Arsons", Column::Arsons),
];

#[derive(Debug, Clone, Copy)]
pub enum Source {
    /// A summary table, one point or bar per group.
    Summary {
        group_by: GroupBy,
        measures: &'static [Measure],
        kind: ChartKind,
        sorted: bool,
    },
    /// Every record as an `(x, y)` point, ordered by `x`.
    Relation { x: Column, y: Column },
    /// Fixed fields of the community picked by the selector.
    RecordFields {
        fields: &'static [Field],
        kind: ChartKind,
    },
    /// Fixed fields of the group picked by the selector.
    GroupFields {
        group_by: GroupBy,
        reduction: Reduction,
        fields: &'static [Field],
        kind: ChartKind,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ChartDef {
    pub id: ChartId,
    /// `{selection}` is replaced with the current selection.
    pub title: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub palette: Palette,
    pub x_range: Option<(f64, f64)>,
    pub source: Source,
}

const SELECTION_PLACEHOLDER: &str = "{selection}";

impl ChartDef {
    pub fn selector(&self) -> Option<SelectorId> {
        match self.source {
            Source::Summary { .. } | Source::Relation { .. } => None,
            Source::RecordFields { .. } => Some(SelectorId::Community),
            Source::GroupFields { group_by, .. } => match group_by {
                GroupBy::State => Some(SelectorId::State),
                GroupBy::Community => Some(SelectorId::Community),
                _ => None,
            },
        }
    }

    pub fn title_for(&self, selection: &str) -> String {
        self.title.replace(SELECTION_PLACEHOLDER, selection)
    }

    pub fn spec(&self, title: String, data: ChartData) -> ChartSpec {
        ChartSpec {
            id: self.id,
            title,
            x_title: self.x_title.to_string(),
            y_title: self.y_title.to_string(),
            x_range: self.x_range,
            palette: self.palette,
            data,
        }
    }
}

const AUTO_THEFTS_BY_STATE: ChartDef = ChartDef {
    id: ChartId::AutoTheftsByState,
    title: "Auto thefts by state",
    x_title: "State",
    y_title: "Auto thefts",
    palette: Palette::Teal,
    x_range: None,
    source: Source::Summary {
        group_by: GroupBy::State,
        measures: &[Measure::sum(Column::AutoTheft)],
        kind: ChartKind::Histogram,
        sorted: true,
    },
};

const BURGLARIES_BY_POPULATION: ChartDef = ChartDef {
    id: ChartId::BurglariesByPopulation,
    title: "Burglaries vs population",
    x_title: "Population",
    y_title: "Burglaries",
    palette: Palette::Crimson,
    x_range: Some((0.0, 1_000_000.0)),
    source: Source::Relation {
        x: Column::Population,
        y: Column::Burglaries,
    },
};

const CRIMES_BY_INCOME: ChartDef = ChartDef {
    id: ChartId::CrimesByIncome,
    title: "Robberies and burglaries by median family income",
    x_title: "Median family income",
    y_title: "Mean per community",
    palette: Palette::Midnight,
    x_range: None,
    source: Source::Summary {
        group_by: GroupBy::IncomeBucket,
        measures: &[Measure::mean(Column::Robberies), Measure::mean(Column::Burglaries)],
        kind: ChartKind::Line,
        sorted: true,
    },
};

const LARCENIES_BY_HOUSEHOLD_SIZE: ChartDef = ChartDef {
    id: ChartId::LarceniesByHouseholdSize,
    title: "Larcenies by household size",
    x_title: "Household size",
    y_title: "Mean larcenies",
    palette: Palette::Teal,
    x_range: None,
    source: Source::Summary {
        group_by: GroupBy::HouseholdSize,
        measures: &[Measure::mean(Column::Larcenies)],
        kind: ChartKind::Histogram,
        sorted: true,
    },
};

const ASSAULTS_BY_URBANIZATION: ChartDef = ChartDef {
    id: ChartId::AssaultsByUrbanization,
    title: "Assaults by urban population share",
    x_title: "Percent urban",
    y_title: "Mean assaults",
    palette: Palette::Crimson,
    x_range: None,
    source: Source::Summary {
        group_by: GroupBy::PctUrban,
        measures: &[Measure::mean(Column::Assaults)],
        kind: ChartKind::Line,
        sorted: true,
    },
};

const COMMUNITY_RACE: ChartDef = ChartDef {
    id: ChartId::CommunityRace,
    title: "Racial composition of {selection}",
    x_title: "",
    y_title: "",
    palette: Palette::Teal,
    x_range: None,
    source: Source::RecordFields {
        fields: RACE_FIELDS,
        kind: ChartKind::Pie,
    },
};

const COMMUNITY_CRIMES: ChartDef = ChartDef {
    id: ChartId::CommunityCrimes,
    title: "Crimes in {selection}",
    x_title: "Crime",
    y_title: "Count",
    palette: Palette::Midnight,
    x_range: None,
    source: Source::RecordFields {
        fields: CRIME_FIELDS,
        kind: ChartKind::Histogram,
    },
};

const STATE_CRIMES: ChartDef = ChartDef {
    id: ChartId::StateCrimes,
    title: "Crimes in {selection}",
    x_title: "Crime",
    y_title: "Total count",
    palette: Palette::Crimson,
    x_range: None,
    source: Source::GroupFields {
        group_by: GroupBy::State,
        reduction: Reduction::Sum,
        fields: CRIME_FIELDS,
        kind: ChartKind::Histogram,
    },
};

const STATE_RACE: ChartDef = ChartDef {
    id: ChartId::StateRace,
    title: "Average racial composition of {selection} communities",
    x_title: "",
    y_title: "",
    palette: Palette::Midnight,
    x_range: None,
    source: Source::GroupFields {
        group_by: GroupBy::State,
        reduction: Reduction::Mean,
        fields: RACE_FIELDS,
        kind: ChartKind::Pie,
    },
};

pub const CATALOG: &[ChartDef] = &[
    AUTO_THEFTS_BY_STATE,
    BURGLARIES_BY_POPULATION,
    CRIMES_BY_INCOME,
    LARCENIES_BY_HOUSEHOLD_SIZE,
    ASSAULTS_BY_URBANIZATION,
    COMMUNITY_RACE,
    COMMUNITY_CRIMES,
    STATE_CRIMES,
    STATE_RACE,
];

fn series_name(measure: &Measure) -> String {
    format!("{} {}", measure.reduction, measure.column)
}

/// Builds the chart for a definition without a selector. Returns `None` for
/// selector-bound definitions.
pub fn static_chart(def: &ChartDef, dataset: &Dataset) -> Option<ChartSpec> {
    let data = match def.source {
        Source::Summary {
            group_by,
            measures,
            kind,
            sorted,
        } => {
            let table = aggregate(dataset, group_by, measures);
            let mut rows = if sorted {
                table.sorted()
            } else {
                table.rows().iter().collect()
            };
            // Line x values are the group keys, so only numeric keys can be plotted.
            if kind == ChartKind::Line {
                rows.retain(|row| row.key.as_f64().is_some());
            }
            let series: Vec<Series> = measures
                .iter()
                .enumerate()
                .map(|(i, measure)| Series {
                    name: series_name(measure),
                    values: rows.iter().map(|row| row.values[i]).collect(),
                })
                .collect();
            match kind {
                ChartKind::Histogram => ChartData::Histogram {
                    x: rows.iter().map(|row| row.key.to_string()).collect(),
                    series,
                },
                ChartKind::Line => ChartData::Line {
                    x: rows.iter().filter_map(|row| row.key.as_f64()).collect(),
                    series,
                },
                // One slice per group, sized by the first measure.
                ChartKind::Pie => ChartData::Pie {
                    names: rows.iter().map(|row| row.key.to_string()).collect(),
                    values: series
                        .into_iter()
                        .next()
                        .map(|s| s.values)
                        .unwrap_or_default(),
                },
            }
        }
        Source::Relation { x, y } => {
            let (xs, ys): (Vec<f64>, Vec<f64>) = dataset
                .sorted_by(x)
                .into_iter()
                .map(|r| (x.value(r), y.value(r)))
                .filter(|(a, b)| !a.is_nan() && !b.is_nan())
                .unzip();
            ChartData::Line {
                x: xs,
                series: vec![Series {
                    name: y.name().to_string(),
                    values: ys,
                }],
            }
        }
        Source::RecordFields { .. } | Source::GroupFields { .. } => return None,
    };
    Some(def.spec(def.title.to_string(), data))
}

/// Lays out fixed fields as the chart kind the definition asks for.
pub fn field_chart(kind: ChartKind, fields: &[Field], values: Vec<f64>, series: &str) -> ChartData {
    let labels = fields.iter().map(|f| f.label.to_string()).collect();
    match kind {
        ChartKind::Pie => ChartData::Pie {
            names: labels,
            values,
        },
        ChartKind::Histogram => ChartData::Histogram {
            x: labels,
            series: vec![Series {
                name: series.to_string(),
                values,
            }],
        },
        ChartKind::Line => ChartData::Line {
            x: (0..fields.len()).map(|i| i as f64).collect(),
            series: vec![Series {
                name: series.to_string(),
                values,
            }],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::record;

    #[test]
    fn every_id_resolves_to_its_own_definition() {
        for def in CATALOG {
            assert_eq!(def.id.def().id, def.id);
        }
        assert_eq!(CATALOG.len(), 9);
    }

    #[test]
    fn only_reactive_titles_take_a_selection() {
        for def in CATALOG {
            let templated = def.title.contains(SELECTION_PLACEHOLDER);
            assert_eq!(templated, def.selector().is_some(), "{}", def.id);
        }
        assert_eq!(COMMUNITY_CRIMES.title_for("Springfield"), "Crimes in Springfield");
    }

    #[test]
    fn auto_thefts_chart_sums_per_state_in_state_order() {
        let mut a = record("A", "TX");
        a.auto_theft = 100.0;
        let mut b = record("B", "CA");
        b.auto_theft = 200.0;
        let mut c = record("C", "AK");
        c.auto_theft = 5.0;
        let mut d = record("D", "TX");
        d.auto_theft = 50.0;
        let dataset = Dataset::new(vec![a, b, c, d]).unwrap();
        let spec = static_chart(&AUTO_THEFTS_BY_STATE, &dataset).unwrap();
        assert_eq!(spec.palette, Palette::Teal);
        match spec.data {
            ChartData::Histogram { x, series } => {
                assert_eq!(x, vec!["AK", "CA", "TX"]);
                assert_eq!(series[0].values, vec![5.0, 200.0, 150.0]);
                assert_eq!(series[0].name, "sum autoTheft");
            }
            other => panic!("unexpected chart data {:?}", other),
        }
    }

    #[test]
    fn line_summaries_are_keyed_on_numbers() {
        for def in CATALOG {
            if let Source::Summary {
                group_by,
                kind: ChartKind::Line,
                ..
            } = def.source
            {
                assert!(group_by.is_numeric(), "{}", def.id);
            }
        }

        const TEXT_KEYED: ChartDef = ChartDef {
            source: Source::Summary {
                group_by: GroupBy::State,
                measures: &[Measure::sum(Column::Murders)],
                kind: ChartKind::Line,
                sorted: true,
            },
            ..ASSAULTS_BY_URBANIZATION
        };
        let dataset = Dataset::new(vec![record("A", "CA")]).unwrap();
        match static_chart(&TEXT_KEYED, &dataset).unwrap().data {
            ChartData::Line { x, series } => {
                assert!(x.is_empty());
                assert!(series[0].values.is_empty());
            }
            other => panic!("unexpected chart data {:?}", other),
        }
    }

    #[test]
    fn summary_pie_has_a_slice_per_group() {
        const ARSON_SHARE: ChartDef = ChartDef {
            source: Source::Summary {
                group_by: GroupBy::State,
                measures: &[Measure::sum(Column::Arsons)],
                kind: ChartKind::Pie,
                sorted: true,
            },
            ..AUTO_THEFTS_BY_STATE
        };
        let mut a = record("A", "NY");
        a.arsons = 3.0;
        let mut b = record("B", "CA");
        b.arsons = 1.0;
        let dataset = Dataset::new(vec![a, b]).unwrap();
        assert_eq!(
            static_chart(&ARSON_SHARE, &dataset).unwrap().data,
            ChartData::Pie {
                names: vec!["CA".into(), "NY".into()],
                values: vec![1.0, 3.0],
            }
        );
    }

    #[test]
    fn burglaries_line_is_ordered_by_population_and_capped_view() {
        let mut a = record("A", "CA");
        a.population = 5000.0;
        a.burglaries = 50.0;
        let mut b = record("B", "CA");
        b.population = 1000.0;
        b.burglaries = 10.0;
        let mut c = record("C", "CA");
        c.population = 3000.0;
        c.burglaries = f64::NAN;
        let dataset = Dataset::new(vec![a, b, c]).unwrap();
        let spec = static_chart(&BURGLARIES_BY_POPULATION, &dataset).unwrap();
        assert_eq!(spec.x_range, Some((0.0, 1_000_000.0)));
        match spec.data {
            ChartData::Line { x, series } => {
                assert_eq!(x, vec![1000.0, 5000.0]);
                assert_eq!(series[0].values, vec![10.0, 50.0]);
            }
            other => panic!("unexpected chart data {:?}", other),
        }
    }

    #[test]
    fn income_line_uses_sorted_buckets_with_two_series() {
        let mut a = record("A", "CA");
        a.med_fam_inc = 42500.0;
        a.robberies = 4.0;
        let mut b = record("B", "CA");
        b.med_fam_inc = 41999.0;
        b.robberies = 2.0;
        let mut c = record("C", "CA");
        c.med_fam_inc = 41200.0;
        c.robberies = 6.0;
        let dataset = Dataset::new(vec![a, b, c]).unwrap();
        let spec = static_chart(&CRIMES_BY_INCOME, &dataset).unwrap();
        match spec.data {
            ChartData::Line { x, series } => {
                assert_eq!(x, vec![41000.0, 42000.0]);
                assert_eq!(series.len(), 2);
                assert_eq!(series[0].values, vec![4.0, 4.0]);
            }
            other => panic!("unexpected chart data {:?}", other),
        }
    }

    #[test]
    fn reactive_definitions_have_no_static_chart() {
        let dataset = Dataset::new(vec![record("A", "CA")]).unwrap();
        assert!(static_chart(&COMMUNITY_RACE, &dataset).is_none());
        assert!(static_chart(&STATE_CRIMES, &dataset).is_none());
    }
}
