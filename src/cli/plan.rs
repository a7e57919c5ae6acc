#![allow(clippy::result_large_err)]

//! YAML cleansing plans: the scripted counterpart of the cleansing wizard.
//!
//! ```yaml
//! name: news-cleanup
//! source_dataset_id: ds-42
//! destination:
//!   name: news-clean
//!   type: TEXT
//! operators:
//!   - operator: html-tag-removal
//!   - operator: text-dedup
//!     params:
//!       similarity_threshold: 0.9
//! ```

use crate::core::catalog::Catalog;
use crate::core::error::AppError;
use crate::core::pipeline::ParameterEditor;
use crate::core::types::ErrorCategory;
use crate::core::wizard::cleansing::DestinationDataset;
use crate::core::wizard::{CleansingTaskFlow, DatasetType, Wizard};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleansingPlan {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub source_dataset_id: String,
    pub destination: PlanDestination,
    #[serde(default)]
    pub operators: Vec<PlanOperator>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanDestination {
    pub name: String,
    #[serde(default, rename = "type")]
    pub dataset_type: DatasetType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanOperator {
    pub operator: String,
    #[serde(default)]
    pub params: IndexMap<String, Value>,
}

/// A plan entry that could not be applied to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanProblem {
    pub location: String,
    pub message: String,
}

impl fmt::Display for PlanProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

impl CleansingPlan {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::from(e).with_context("path", path.display().to_string())
        })?;
        Self::from_yaml_str(&content).map_err(|e| e.with_context("path", path.display().to_string()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, AppError> {
        serde_yaml::from_str(content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("invalid cleansing plan: {}", e),
            )
            .with_code("INVALID_PLAN")
        })
    }

    /// Replay the plan through the wizard, advancing as far as validation allows.
    ///
    /// Operators are added in plan order and each parameter goes through the
    /// parameter editor, so plan values get the same coercion as interactive
    /// edits. Entries that cannot be applied are returned as problems.
    pub fn into_wizard(self, catalog: Catalog) -> (Wizard<CleansingTaskFlow>, Vec<PlanProblem>) {
        let mut problems = Vec::new();
        let mut flow = CleansingTaskFlow::new(catalog.clone());
        flow.basic.name = self.name;
        flow.basic.description = self.description;
        flow.basic.source_dataset_id = self.source_dataset_id;
        flow.basic.destination.replace(DestinationDataset {
            name: self.destination.name,
            dataset_type: self.destination.dataset_type,
        });

        let editor = ParameterEditor::new(&catalog);
        for (idx, entry) in self.operators.into_iter().enumerate() {
            let location = format!("operators[{}]", idx);
            let Some(template) = catalog.get(&entry.operator) else {
                problems.push(PlanProblem {
                    location,
                    message: format!("unknown operator '{}'", entry.operator),
                });
                continue;
            };
            let instance = flow.pipeline.add(template);
            for (key, raw) in &entry.params {
                match editor.on_change(&mut flow.pipeline, instance.instance_id(), key, raw) {
                    Ok(true) => {}
                    Ok(false) => problems.push(PlanProblem {
                        location: format!("{}.params.{}", location, key),
                        message: format!("'{}' has no parameter '{}'", entry.operator, key),
                    }),
                    Err(err) => problems.push(PlanProblem {
                        location: format!("{}.params.{}", location, key),
                        message: err.to_string(),
                    }),
                }
            }
        }

        let mut wizard = Wizard::new(flow);
        while wizard.next() {}
        (wizard, problems)
    }
}
