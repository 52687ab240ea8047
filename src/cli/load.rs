//! Dry-run the task loader over a directory

use std::path::Path;

use super::CliError;
use crate::load::{ClientCall, LoadConfig, LoadReport, LoadService, MemoryClient};

/// Result of a dry run: the loader's report and the API calls it would make.
#[derive(Debug)]
pub struct LoadOutcome {
    pub report: LoadReport,
    pub calls: Vec<ClientCall>,
}

/// Validate `dir` and load it into an empty in-memory task store.
pub fn execute_load(dir: &Path) -> Result<LoadOutcome, CliError> {
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(dir)
    };

    let config = LoadConfig::new(dir);
    config.validate()?;

    let mut service = LoadService::new(config, MemoryClient::new());
    let report = service.load()?;
    let calls = service.into_client().calls().to_vec();

    Ok(LoadOutcome { report, calls })
}
