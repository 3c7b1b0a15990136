use std::error::Error;
use std::io;

use serde::Serialize;
use tracing::{info, warn};

use crime_dash::chart::ChartSpec;
use crime_dash::config::DashboardConfig;
use crime_dash::csv_reader;
use crime_dash::dataset::Dataset;
use crime_dash::logging;
use crime_dash::reactive::{Dashboard, SelectorId};

#[derive(Serialize)]
struct Export<'a> {
    static_charts: &'a [ChartSpec],
    reactive_charts: Vec<ChartSpec>,
}

/// Writes every chart, reactive ones at their default selection, as JSON.
fn main() -> Result<(), Box<dyn Error>> {
    let config = DashboardConfig::load()?;
    logging::init_stderr(&config.log_filter);

    let records = csv_reader::read_data(&config.data_path)?;
    let dataset = Dataset::new(records)?;
    let dashboard = Dashboard::build(&dataset);

    let mut reactive_charts = Vec::new();
    for selector in SelectorId::ALL {
        let selection = dashboard.default_selection(selector);
        for (chart, result) in dashboard.update_all(&selection) {
            match result {
                Ok(spec) => reactive_charts.push(spec),
                Err(e) => warn!(chart = %chart, "{}", e),
            }
        }
    }

    let export = Export {
        static_charts: dashboard.static_charts(),
        reactive_charts,
    };
    serde_json::to_writer_pretty(io::stdout().lock(), &export)?;
    println!();
    info!(
        static_charts = export.static_charts.len(),
        reactive_charts = export.reactive_charts.len(),
        "exported"
    );
    Ok(())
}
