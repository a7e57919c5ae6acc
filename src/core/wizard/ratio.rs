use crate::api::Resource;
use crate::core::wizard::{require_text, ValidationIssue, WizardFlow};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioStep {
    BasicInfo,
    Datasets,
    Ratios,
}

impl fmt::Display for RatioStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioStep::BasicInfo => f.write_str("basic_info"),
            RatioStep::Datasets => f.write_str("datasets"),
            RatioStep::Ratios => f.write_str("ratios"),
        }
    }
}

/// Wizard state for a ratio (data synthesis mix) task.
///
/// Allocations can only exist for selected datasets: deselecting a dataset drops
/// its allocation in the same call.
#[derive(Debug, Clone, Default)]
pub struct RatioTaskFlow {
    pub name: String,
    pub description: String,
    datasets: IndexSet<String>,
    total: u64,
    allocations: IndexMap<String, u64>,
}

impl RatioTaskFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(String::as_str)
    }

    pub fn select_dataset(&mut self, id: impl Into<String>) -> bool {
        self.datasets.insert(id.into())
    }

    pub fn deselect_dataset(&mut self, id: &str) -> bool {
        self.allocations.shift_remove(id);
        self.datasets.shift_remove(id)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = total;
    }

    /// Set the sample count drawn from `dataset`; ignored unless the dataset is selected.
    pub fn set_allocation(&mut self, dataset: &str, count: u64) -> bool {
        if !self.datasets.contains(dataset) {
            return false;
        }
        self.allocations.insert(dataset.to_string(), count);
        true
    }

    /// Split `total` evenly across selected datasets; the remainder goes to the first ones.
    pub fn distribute_evenly(&mut self) {
        let n = self.datasets.len() as u64;
        if n == 0 {
            return;
        }
        let base = self.total / n;
        let remainder = self.total % n;
        self.allocations = self
            .datasets
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), base + u64::from((i as u64) < remainder)))
            .collect();
    }

    pub fn allocation(&self, dataset: &str) -> Option<u64> {
        self.allocations.get(dataset).copied()
    }

    pub fn allocated(&self) -> u64 {
        self.allocations.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioAllocation {
    pub dataset_id: String,
    pub count: u64,
}

/// Body posted to the ratio task collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioTaskRequest {
    pub name: String,
    pub description: String,
    pub totals: u64,
    pub ratios: Vec<RatioAllocation>,
    pub created_at: DateTime<Utc>,
}

impl WizardFlow for RatioTaskFlow {
    type Step = RatioStep;
    type Output = RatioTaskRequest;

    const STEPS: &'static [RatioStep] = &[RatioStep::BasicInfo, RatioStep::Datasets, RatioStep::Ratios];

    fn resource(&self) -> Resource {
        Resource::RatioTasks
    }

    fn validate_step(&self, step: RatioStep) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        match step {
            RatioStep::BasicInfo => require_text(&mut issues, "name", &self.name),
            RatioStep::Datasets => {
                if self.datasets.is_empty() {
                    issues.push(ValidationIssue::new("selection", "select at least one dataset"));
                }
            }
            RatioStep::Ratios => {
                if self.total == 0 {
                    issues.push(ValidationIssue::new("total", "must be greater than zero"));
                }
                if self.allocations.is_empty() {
                    issues.push(ValidationIssue::new("allocations", "allocate at least one dataset"));
                }
                for (dataset, count) in &self.allocations {
                    if *count == 0 {
                        issues.push(ValidationIssue::new(
                            dataset.clone(),
                            "must be greater than zero",
                        ));
                    }
                }
                if self.total > 0 && self.allocated() != self.total {
                    issues.push(ValidationIssue::new(
                        "allocated",
                        format!("allocated {} of {} samples", self.allocated(), self.total),
                    ));
                }
            }
        }
        issues
    }

    fn assemble(&self, created_at: DateTime<Utc>) -> RatioTaskRequest {
        RatioTaskRequest {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            totals: self.total,
            ratios: self
                .allocations
                .iter()
                .map(|(dataset_id, count)| RatioAllocation {
                    dataset_id: dataset_id.clone(),
                    count: *count,
                })
                .collect(),
            created_at,
        }
    }
}
