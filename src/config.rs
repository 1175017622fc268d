use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::domain::entities::config::DatatableConfig;

pub const DEFAULT_CONFIG_FILE: &str = "datatables.toml";

/// Settings for serving one table from the command line.
///
/// ```toml
/// database = "people.sqlite"
/// table = "people"
/// url_template = "/people/{id}/"
///
/// [datatable]
/// columns = ["name", "age"]
/// order_columns = ["name", "age"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: Option<PathBuf>,
    pub table: Option<String>,
    pub url_template: Option<String>,
    pub debug: bool,
    pub datatable: DatatableConfig,
}

impl AppConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("failed to parse config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "hellhbbd", "datatables")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("datatables.sqlite"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::config::OrderColumn;

    #[test]
    fn parses_embedded_datatable_section() {
        let config = AppConfig::from_toml_str(
            r#"
            database = "people.sqlite"
            table = "people"
            url_template = "/people/{id}/"

            [datatable]
            columns = ["name", "age"]
            order_columns = ["name", ["age", "name"]]
            searchable_columns = ["name"]
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.database, Some(PathBuf::from("people.sqlite")));
        assert_eq!(config.table.as_deref(), Some("people"));
        assert!(!config.debug);
        assert_eq!(config.datatable.columns.len(), 2);
        assert_eq!(
            config.datatable.order_columns[1],
            OrderColumn::from(["age", "name"])
        );
        assert_eq!(config.datatable.max_display_length, 100);
    }

    #[test]
    fn default_db_path_uses_app_directory() {
        let db_path = default_db_path().expect("default db path should resolve");
        assert!(db_path.ends_with("datatables.sqlite"));
    }
}
