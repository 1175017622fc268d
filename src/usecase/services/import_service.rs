use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::infra::import::csv::{import_csv_to_sqlite, ImportResult};

pub struct ImportService {
    db_path: PathBuf,
}

impl ImportService {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn import_csv(&self, path: &Path, table: &str) -> Result<ImportResult> {
        import_csv_to_sqlite(&self.db_path, path, table)
    }
}
