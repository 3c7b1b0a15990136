use std::fs;

use crime_dash::catalog::ChartId;
use crime_dash::csv_reader::read_data;
use crime_dash::{
    aggregate, ChartData, Column, DashError, Dashboard, Dataset, GroupBy, GroupKey, Measure,
    SelectorId, Selection,
};

const CSV: &str = "\
communityName,state,countyCode,population,householdsize,medFamInc,pctUrban,racepctblack,racePctWhite,racePctAsian,racePctHisp,murders,rapes,robberies,assaults,burglaries,larcenies,autoTheft,arsons
Springfield,IL,?,116250,2.3,41999,100,0.2,0.6,0.1,0.1,5,20,150,300,900,3000,400,30
LosAngeles,CA,37,3485398,2.9,42500,100,0.14,0.53,0.1,0.4,1000,1900,39000,40000,49000,100000,100,600
Oakland,CA,1,372242,2.6,37000,100,0.43,0.32,0.15,0.14,146,400,4000,4700,8000,17000,200,?
Shelbyville,TN,?,14049,2.5,28000,0,0.2,0.76,0.01,0.03,1,5,20,80,200,700,40,4
";

fn load() -> Dataset {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crimedata.csv");
    fs::write(&path, CSV).unwrap();
    Dataset::new(read_data(&path).unwrap()).unwrap()
}

#[test]
fn race_pie_for_springfield() {
    let dataset = load();
    let dashboard = Dashboard::build(&dataset);
    let spec = dashboard
        .reactor()
        .update(ChartId::CommunityRace, &Selection::Community("Springfield".into()))
        .unwrap();
    match spec.data {
        ChartData::Pie { names, values } => {
            assert_eq!(names, vec!["Black", "White", "Asian", "Hispanic"]);
            assert_eq!(values, vec![0.2, 0.6, 0.1, 0.1]);
        }
        other => panic!("unexpected chart data {:?}", other),
    }
}

#[test]
fn california_auto_thefts_sum() {
    let dataset = load();
    let table = aggregate(&dataset, GroupBy::State, &[Measure::sum(Column::AutoTheft)]);
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.value(&GroupKey::text("CA"), Measure::sum(Column::AutoTheft)),
        Some(300.0)
    );
}

#[test]
fn income_buckets_truncate() {
    let dataset = load();
    let table = aggregate(&dataset, GroupBy::IncomeBucket, &[Measure::sum(Column::Murders)]);
    let keys: Vec<f64> = table.sorted().iter().filter_map(|r| r.key.as_f64()).collect();
    assert_eq!(keys, vec![28000.0, 37000.0, 41000.0, 42000.0]);
}

#[test]
fn static_charts_cover_the_catalog() {
    let dataset = load();
    let dashboard = Dashboard::build(&dataset);
    let ids: Vec<ChartId> = dashboard.static_charts().iter().map(|c| c.id).collect();
    assert_eq!(
        ids,
        vec![
            ChartId::AutoTheftsByState,
            ChartId::BurglariesByPopulation,
            ChartId::CrimesByIncome,
            ChartId::LarceniesByHouseholdSize,
            ChartId::AssaultsByUrbanization,
        ]
    );
}

#[test]
fn default_selections_come_from_the_first_record() {
    let dataset = load();
    let dashboard = Dashboard::build(&dataset);
    for selector in SelectorId::ALL {
        let selection = dashboard.default_selection(selector);
        assert_eq!(selection.key(), dashboard.options(selector)[0]);
        for (_, result) in dashboard.update_all(&selection) {
            assert!(result.is_ok());
        }
    }
}

#[test]
fn updates_are_reproducible_and_unknown_keys_are_reported() {
    let dataset = load();
    let dashboard = Dashboard::build(&dataset);
    let selection = Selection::State("CA".into());
    let first = serde_json::to_string(&dashboard.update_all(&selection)[0].1.as_ref().unwrap()).unwrap();
    let second = serde_json::to_string(&dashboard.update_all(&selection)[0].1.as_ref().unwrap()).unwrap();
    assert_eq!(first, second);

    let missing = dashboard
        .reactor()
        .update(ChartId::StateCrimes, &Selection::State("WY".into()));
    assert!(matches!(missing, Err(DashError::NotFound { .. })));
}

#[test]
fn missing_required_column_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crimedata.csv");
    fs::write(&path, CSV.replace("autoTheft,", "")).unwrap();
    match read_data(&path) {
        Err(DashError::MissingColumn(column)) => assert_eq!(column, "autoTheft"),
        other => panic!("expected missing column, got {:?}", other),
    }
}
