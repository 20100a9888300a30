//! Generation parameter bundles

use serde::{Deserialize, Serialize};

use crate::history::HistoryCategory;
use crate::model::TableInfo;

/// Where one kind of generated artifact is written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub target_project: String,
    #[serde(default)]
    pub target_package: String,
}

impl TargetConfig {
    pub fn new(target_project: impl Into<String>, target_package: impl Into<String>) -> Self {
        Self {
            target_project: target_project.into(),
            target_package: target_package.into(),
        }
    }

    pub fn package(target_package: impl Into<String>) -> Self {
        Self {
            target_project: String::new(),
            target_package: target_package.into(),
        }
    }
}

/// Table selections and package targets for one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorParamWrapper {
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub selected_tables: Vec<TableInfo>,
    #[serde(default)]
    pub model_config: Option<TargetConfig>,
    #[serde(default)]
    pub client_config: Option<TargetConfig>,
    #[serde(default)]
    pub sql_map_config: Option<TargetConfig>,
}

impl GeneratorParamWrapper {
    pub fn new(selected_tables: Vec<TableInfo>) -> Self {
        Self {
            selected_tables,
            ..Default::default()
        }
    }

    /// Target packages of the configured targets, keyed by history category
    pub fn target_packages(&self) -> Vec<(HistoryCategory, &str)> {
        [
            (HistoryCategory::ModelPackage, &self.model_config),
            (HistoryCategory::ClientPackage, &self.client_config),
            (HistoryCategory::SqlMapPackage, &self.sql_map_config),
        ]
        .into_iter()
        .filter_map(|(category, config)| {
            config
                .as_ref()
                .map(|config| (category, config.target_package.as_str()))
        })
        .collect()
    }
}

/// User defaults applied to new generation runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultParameters {
    #[serde(default)]
    pub model_config: TargetConfig,
    #[serde(default)]
    pub client_config: TargetConfig,
    #[serde(default)]
    pub sql_map_config: TargetConfig,
    #[serde(default)]
    pub generate_comments: bool,
}
