use crate::api::Resource;
use crate::core::catalog::Catalog;
use crate::core::pipeline::{OperatorConfig, PipelineList, Versioned};
use crate::core::wizard::{require_text, DatasetType, ValidationIssue, WizardFlow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleansingStep {
    BasicInfo,
    Operators,
}

impl fmt::Display for CleansingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleansingStep::BasicInfo => f.write_str("basic_info"),
            CleansingStep::Operators => f.write_str("operators"),
        }
    }
}

/// Dataset the cleansing output is written into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationDataset {
    pub name: String,
    pub dataset_type: DatasetType,
}

#[derive(Debug, Clone, Default)]
pub struct CleansingBasicInfo {
    pub name: String,
    pub description: String,
    pub source_dataset_id: String,
    pub destination: Versioned<DestinationDataset>,
}

pub struct CleansingTaskFlow {
    pub basic: CleansingBasicInfo,
    pub pipeline: PipelineList,
    catalog: Catalog,
}

impl CleansingTaskFlow {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            basic: CleansingBasicInfo::default(),
            pipeline: PipelineList::new(),
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Body posted to the cleansing task collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleansingTaskRequest {
    pub name: String,
    pub description: String,
    pub src_dataset_id: String,
    pub dest_dataset_name: String,
    pub dest_dataset_type: DatasetType,
    pub operators: Vec<OperatorConfig>,
    pub created_at: DateTime<Utc>,
}

impl WizardFlow for CleansingTaskFlow {
    type Step = CleansingStep;
    type Output = CleansingTaskRequest;

    const STEPS: &'static [CleansingStep] = &[CleansingStep::BasicInfo, CleansingStep::Operators];

    fn resource(&self) -> Resource {
        Resource::CleansingTasks
    }

    fn validate_step(&self, step: CleansingStep) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        match step {
            CleansingStep::BasicInfo => {
                require_text(&mut issues, "name", &self.basic.name);
                require_text(&mut issues, "source_dataset_id", &self.basic.source_dataset_id);
                require_text(
                    &mut issues,
                    "destination.name",
                    &self.basic.destination.get().name,
                );
            }
            CleansingStep::Operators => {
                if self.pipeline.is_empty() {
                    issues.push(ValidationIssue::new("pipeline", "add at least one operator"));
                }
                for id in self.pipeline.unconfigured(&self.catalog) {
                    issues.push(ValidationIssue::new(id.to_string(), "needs configuration"));
                }
            }
        }
        issues
    }

    fn assemble(&self, created_at: DateTime<Utc>) -> CleansingTaskRequest {
        let destination = self.basic.destination.get();
        CleansingTaskRequest {
            name: self.basic.name.trim().to_string(),
            description: self.basic.description.clone(),
            src_dataset_id: self.basic.source_dataset_id.clone(),
            dest_dataset_name: destination.name.clone(),
            dest_dataset_type: destination.dataset_type,
            operators: self.pipeline.to_submission(),
            created_at,
        }
    }
}
