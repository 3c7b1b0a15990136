use std::fs::File;
use std::io;
use std::path::Path;

use serde::{de, Deserialize, Deserializer};
use tracing::{debug, info};

use crate::error::DashError;

/// Columns the dashboard reads. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "communityName",
    "state",
    "population",
    "householdsize",
    "medFamInc",
    "pctUrban",
    "racepctblack",
    "racePctWhite",
    "racePctAsian",
    "racePctHisp",
    "murders",
    "rapes",
    "robberies",
    "assaults",
    "burglaries",
    "larcenies",
    "autoTheft",
    "arsons",
];

/// Spellings of the community column seen in published copies of the dataset.
const COMMUNITY_ALIASES: &[&str] = &["communityName", "communityname", "Êcommunityname"];

const MISSING_MARKER: &str = "?";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Record {
    #[serde(rename = "communityName", alias = "communityname", alias = "Êcommunityname")]
    pub community_name: String,
    pub state: String,
    #[serde(deserialize_with = "number_or_missing")]
    pub population: f64,
    #[serde(rename = "householdsize", deserialize_with = "number_or_missing")]
    pub household_size: f64,
    #[serde(rename = "medFamInc", deserialize_with = "number_or_missing")]
    pub med_fam_inc: f64,
    #[serde(rename = "pctUrban", deserialize_with = "number_or_missing")]
    pub pct_urban: f64,
    #[serde(rename = "racepctblack", deserialize_with = "number_or_missing")]
    pub race_pct_black: f64,
    #[serde(rename = "racePctWhite", deserialize_with = "number_or_missing")]
    pub race_pct_white: f64,
    #[serde(rename = "racePctAsian", deserialize_with = "number_or_missing")]
    pub race_pct_asian: f64,
    #[serde(rename = "racePctHisp", deserialize_with = "number_or_missing")]
    pub race_pct_hisp: f64,
    #[serde(deserialize_with = "number_or_missing")]
    pub murders: f64,
    #[serde(deserialize_with = "number_or_missing")]
    pub rapes: f64,
    #[serde(deserialize_with = "number_or_missing")]
    pub robberies: f64,
    #[serde(deserialize_with = "number_or_missing")]
    pub assaults: f64,
    #[serde(deserialize_with = "number_or_missing")]
    pub burglaries: f64,
    #[serde(deserialize_with = "number_or_missing")]
    pub larcenies: f64,
    #[serde(rename = "autoTheft", deserialize_with = "number_or_missing")]
    pub auto_theft: f64,
    #[serde(deserialize_with = "number_or_missing")]
    pub arsons: f64,
}

// Unknown cells are `?` in the published file; they load as NaN.
fn number_or_missing<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() || raw == MISSING_MARKER {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|_| de::Error::custom(format!("expected a number, found `{}`", raw)))
}

fn has_column(headers: &csv::StringRecord, column: &str) -> bool {
    headers.iter().any(|h| {
        let h = h.trim();
        h == column || (column == "communityName" && COMMUNITY_ALIASES.contains(&h))
    })
}

pub fn read_data(path: &Path) -> Result<Vec<Record>, DashError> {
    let file = File::open(path).map_err(|source| DashError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_from(file)?;
    info!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(records)
}

pub fn read_from<R: io::Read>(reader: R) -> Result<Vec<Record>, DashError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !has_column(&headers, c)) {
        return Err(DashError::MissingColumn(*missing));
    }
    debug!(columns = headers.len(), "header validated");

    let mut records = Vec::<Record>::new();
    for result in rdr.deserialize() {
        let record: Record = result?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "communityName,state,countyCode,population,householdsize,medFamInc,pctUrban,racepctblack,racePctWhite,racePctAsian,racePctHisp,murders,rapes,robberies,assaults,burglaries,larcenies,autoTheft,arsons";

    #[test]
    fn reads_records_and_ignores_extra_columns() {
        let csv = format!(
            "{}\nSpringfield,IL,17,116250,2.3,41999,100,0.2,0.6,0.1,0.1,5,20,150,300,900,3000,400,30\n",
            HEADER
        );
        let records = read_from(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.community_name, "Springfield");
        assert_eq!(r.state, "IL");
        assert_eq!(r.med_fam_inc, 41999.0);
        assert_eq!(r.race_pct_black, 0.2);
        assert_eq!(r.auto_theft, 400.0);
    }

    #[test]
    fn question_mark_loads_as_nan() {
        let csv = format!(
            "{}\nTown,OH,?,1000,2.5,30000,0,0.1,0.8,0.05,0.05,?,1,2,3,4,5,6,\n",
            HEADER
        );
        let records = read_from(csv.as_bytes()).unwrap();
        assert!(records[0].murders.is_nan());
        assert!(records[0].arsons.is_nan());
        assert_eq!(records[0].rapes, 1.0);
    }

    #[test]
    fn lowercase_community_header_is_accepted() {
        let csv = "communityname,state,population,householdsize,medFamInc,pctUrban,racepctblack,racePctWhite,racePctAsian,racePctHisp,murders,rapes,robberies,assaults,burglaries,larcenies,autoTheft,arsons\nA,CA,1,1,1,1,0,1,0,0,0,0,0,0,0,0,0,0\n";
        let records = read_from(csv.as_bytes()).unwrap();
        assert_eq!(records[0].community_name, "A");
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let header = HEADER.replace(",autoTheft", "");
        let csv = format!("{}\n", header);
        match read_from(csv.as_bytes()) {
            Err(DashError::MissingColumn(column)) => assert_eq!(column, "autoTheft"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_cell_is_a_csv_error() {
        let csv = format!(
            "{}\nTown,OH,1,lots,2.5,30000,0,0.1,0.8,0.05,0.05,1,1,2,3,4,5,6,7\n",
            HEADER
        );
        assert!(matches!(read_from(csv.as_bytes()), Err(DashError::Csv(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_data(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, DashError::Io { .. }));
    }
}
