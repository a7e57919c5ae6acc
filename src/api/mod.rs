//! REST collaborator: entity CRUD, file sub-resources, and tags.

pub mod client;
pub mod upload;

pub use client::HttpApiClient;
pub use upload::{create_dataset_with_uploads, upload_all, DatasetCreateOutcome, UploadCanceller, UploadFailure, UploadReport};

use crate::core::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Entity collections exposed by the platform API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Datasets,
    CleansingTasks,
    AnnotationTasks,
    RatioTasks,
    KnowledgeBases,
}

impl Resource {
    /// Module prefix shared by a collection and its tag sibling.
    pub fn scope(&self) -> &'static str {
        match self {
            Resource::Datasets => "data-management",
            Resource::CleansingTasks => "cleaning",
            Resource::AnnotationTasks => "annotation",
            Resource::RatioTasks => "synthesis",
            Resource::KnowledgeBases => "knowledge-base",
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            Resource::Datasets => "datasets",
            Resource::CleansingTasks => "tasks",
            Resource::AnnotationTasks => "tasks",
            Resource::RatioTasks => "ratio-tasks",
            Resource::KnowledgeBases => "bases",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope(), self.collection())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "datasets" | "dataset" => Ok(Resource::Datasets),
            "cleansing" | "cleansing-tasks" | "cleaning" => Ok(Resource::CleansingTasks),
            "annotation" | "annotation-tasks" => Ok(Resource::AnnotationTasks),
            "ratio" | "ratio-tasks" => Ok(Resource::RatioTasks),
            "knowledge-bases" | "knowledge-base" | "kb" => Ok(Resource::KnowledgeBases),
            _ => Err(format!("unknown resource '{}'", value)),
        }
    }
}

/// Filters and paging for list calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub keyword: Option<String>,
    pub entity_type: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub page: u32,
    pub page_size: u32,
}

impl ListQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }

    /// Query pairs in wire order; empty filters are omitted.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            pairs.push(("keyword", keyword.trim().to_string()));
        }
        if let Some(entity_type) = &self.entity_type {
            pairs.push(("type", entity_type.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("pageSize", self.page_size.to_string()));
        pairs
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
}

impl Page<Value> {
    /// Decode the raw results into a typed page.
    pub fn decode<T: serde::de::DeserializeOwned>(self) -> Result<Page<T>, AppError> {
        let results = self
            .results
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Page {
            results,
            total_elements: self.total_elements,
        })
    }
}

/// Entry of an entity's file sub-resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "name")]
    pub file_name: String,
    #[serde(default, alias = "fileSize")]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }
}

/// Extract an entity id, accepting both string and numeric ids.
pub fn entity_id(entity: &Value) -> Option<String> {
    match entity.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Persistence collaborator addressed by resource path and verb.
#[async_trait]
pub trait EntityApi: Send + Sync {
    async fn list(&self, resource: Resource, query: &ListQuery) -> Result<Page<Value>, AppError>;

    async fn get(&self, resource: Resource, id: &str) -> Result<Value, AppError>;

    /// Returns the echoed entity, or `Value::Null` for an empty body.
    async fn create(&self, resource: Resource, body: Value) -> Result<Value, AppError>;

    async fn update(&self, resource: Resource, id: &str, body: Value) -> Result<Value, AppError>;

    /// Deleting an entity that is already gone succeeds.
    async fn delete(&self, resource: Resource, id: &str) -> Result<(), AppError>;

    async fn list_files(&self, resource: Resource, id: &str) -> Result<Vec<FileEntry>, AppError>;

    async fn upload_file(
        &self,
        resource: Resource,
        id: &str,
        path: &Path,
    ) -> Result<FileEntry, AppError>;

    async fn delete_file(&self, resource: Resource, id: &str, file_id: &str)
        -> Result<(), AppError>;

    async fn list_tags(&self, resource: Resource) -> Result<Vec<Tag>, AppError>;

    async fn create_tag(&self, resource: Resource, tag: &Tag) -> Result<Tag, AppError>;

    async fn update_tag(&self, resource: Resource, tag_id: &str, tag: &Tag)
        -> Result<Tag, AppError>;

    async fn delete_tag(&self, resource: Resource, tag_id: &str) -> Result<(), AppError>;
}
