use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::DashError;

fn filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Logs to a file. The terminal belongs to the UI while the dashboard runs.
pub fn init_file(default_directives: &str, path: &Path) -> Result<(), DashError> {
    let file = File::create(path).map_err(|source| DashError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    let _ = fmt()
        .with_env_filter(filter(default_directives))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

pub fn init_stderr(default_directives: &str) {
    let _ = fmt()
        .with_env_filter(filter(default_directives))
        .with_writer(io::stderr)
        .try_init();
}
