use crate::api::Resource;
use crate::core::pipeline::Versioned;
use crate::core::wizard::{require_text, ValidationIssue, WizardFlow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetType {
    #[default]
    Text,
    Image,
    Audio,
    Video,
    Multimodal,
}

impl FromStr for DatasetType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "text" => Ok(DatasetType::Text),
            "image" => Ok(DatasetType::Image),
            "audio" => Ok(DatasetType::Audio),
            "video" => Ok(DatasetType::Video),
            "multimodal" => Ok(DatasetType::Multimodal),
            _ => Err(format!(
                "invalid dataset type '{}'; supported values are text, image, audio, video, multimodal",
                value
            )),
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetType::Text => "TEXT",
            DatasetType::Image => "IMAGE",
            DatasetType::Audio => "AUDIO",
            DatasetType::Video => "VIDEO",
            DatasetType::Multimodal => "MULTIMODAL",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetStep {
    BasicInfo,
    Import,
}

impl fmt::Display for DatasetStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetStep::BasicInfo => f.write_str("basic_info"),
            DatasetStep::Import => f.write_str("import"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatasetBasicInfo {
    pub name: String,
    pub description: String,
    pub dataset_type: DatasetType,
    pub tags: Vec<String>,
}

/// Where the initial dataset content comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportSource {
    /// Create an empty dataset.
    #[default]
    Empty,
    /// Upload local files once the dataset exists.
    LocalUpload,
    /// Pull from a finished collection task.
    Collection {
        #[serde(rename = "taskId")]
        task_id: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportConfig {
    pub source: ImportSource,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct DatasetCreateFlow {
    pub basic: DatasetBasicInfo,
    pub import: Versioned<ImportConfig>,
}

impl DatasetCreateFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files to upload after creation; empty unless the source is a local upload.
    pub fn pending_uploads(&self) -> &[PathBuf] {
        let import = self.import.get();
        match import.source {
            ImportSource::LocalUpload => import.files.as_slice(),
            _ => &[],
        }
    }
}

/// Body posted to the dataset collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCreateRequest {
    pub name: String,
    pub description: String,
    pub dataset_type: DatasetType,
    pub tags: Vec<String>,
    pub import_source: ImportSource,
    pub created_at: DateTime<Utc>,
}

impl WizardFlow for DatasetCreateFlow {
    type Step = DatasetStep;
    type Output = DatasetCreateRequest;

    const STEPS: &'static [DatasetStep] = &[DatasetStep::BasicInfo, DatasetStep::Import];

    fn resource(&self) -> Resource {
        Resource::Datasets
    }

    fn validate_step(&self, step: DatasetStep) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        match step {
            DatasetStep::BasicInfo => {
                require_text(&mut issues, "name", &self.basic.name);
                if self.basic.tags.iter().any(|t| t.trim().is_empty()) {
                    issues.push(ValidationIssue::new("tags", "tags must not be blank"));
                }
            }
            DatasetStep::Import => {
                let import = self.import.get();
                match &import.source {
                    ImportSource::Empty => {}
                    ImportSource::LocalUpload => {
                        if import.files.is_empty() {
                            issues.push(ValidationIssue::new("files", "select at least one file"));
                        }
                    }
                    ImportSource::Collection { task_id } => {
                        require_text(&mut issues, "task_id", task_id);
                    }
                }
            }
        }
        issues
    }

    fn assemble(&self, created_at: DateTime<Utc>) -> DatasetCreateRequest {
        DatasetCreateRequest {
            name: self.basic.name.trim().to_string(),
            description: self.basic.description.clone(),
            dataset_type: self.basic.dataset_type,
            tags: self.basic.tags.clone(),
            import_source: self.import.get().source.clone(),
            created_at,
        }
    }
}
