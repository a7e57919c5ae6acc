#![allow(clippy::result_large_err)]

use crate::api::{EntityApi, FileEntry, ListQuery, Page, Resource, Tag};
use crate::core::config::ApiConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// ASCII set for encoding path segments (slashes included).
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'/')
    .add(b'?')
    .add(b'#')
    .add(b'%');

/// Longest response body excerpt carried in error context.
const BODY_EXCERPT_LIMIT: usize = 512;

/// HTTP client targeting the configured platform API.
#[derive(Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let base_url = reqwest::Url::parse(&config.base_url).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("invalid API base URL '{}': {}", config.base_url, e),
            )
            .with_code("INVALID_BASE_URL")
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(HttpApiClient { http, base_url })
    }

    pub fn base_url(&self) -> &reqwest::Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> String {
        join_path(&self.base_url, segments)
    }

    fn entity_url(&self, resource: Resource, id: &str) -> String {
        let encoded = encode_segment(id);
        self.url(&[resource.scope(), resource.collection(), &encoded])
    }

    fn files_url(&self, resource: Resource, id: &str) -> String {
        let encoded = encode_segment(id);
        self.url(&[resource.scope(), resource.collection(), &encoded, "files"])
    }

    fn tags_url(&self, resource: Resource) -> String {
        self.url(&[resource.scope(), "tags"])
    }

    async fn send(
        &self,
        request: RequestBuilder,
        method: Method,
        url: &str,
    ) -> Result<Value, AppError> {
        tracing::debug!("{} {}", method, url);
        let resp = request.send().await.map_err(|e| {
            AppError::from(e)
                .with_context("method", method.as_str())
                .with_context("url", url)
        })?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            tracing::warn!("{} {} failed with {}", method, url, status);
            return Err(status_error(status, &method, url, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("malformed response from {} {}: {}", method, url, e),
            )
            .with_code("MALFORMED_RESPONSE")
            .with_context("body", excerpt(&text))
        })
    }

    async fn send_ignoring_missing(
        &self,
        request: RequestBuilder,
        method: Method,
        url: &str,
    ) -> Result<(), AppError> {
        match self.send(request, method, url).await {
            Ok(_) => Ok(()),
            Err(err) if err.category == ErrorCategory::NotFound => {
                tracing::debug!("{} already absent", url);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl EntityApi for HttpApiClient {
    async fn list(&self, resource: Resource, query: &ListQuery) -> Result<Page<Value>, AppError> {
        let url = self.url(&[resource.scope(), resource.collection()]);
        let request = self.http.get(&url).query(&query.to_pairs());
        let value = self.send(request, Method::GET, &url).await?;
        if value.is_null() {
            return Ok(Page {
                results: Vec::new(),
                total_elements: 0,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn get(&self, resource: Resource, id: &str) -> Result<Value, AppError> {
        let url = self.entity_url(resource, id);
        let request = self.http.get(&url);
        self.send(request, Method::GET, &url).await
    }

    async fn create(&self, resource: Resource, body: Value) -> Result<Value, AppError> {
        let url = self.url(&[resource.scope(), resource.collection()]);
        let request = self.http.post(&url).json(&body);
        let created = self.send(request, Method::POST, &url).await?;
        tracing::info!("Created {} entity", resource);
        Ok(created)
    }

    async fn update(&self, resource: Resource, id: &str, body: Value) -> Result<Value, AppError> {
        let url = self.entity_url(resource, id);
        let request = self.http.put(&url).json(&body);
        self.send(request, Method::PUT, &url).await
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<(), AppError> {
        let url = self.entity_url(resource, id);
        let request = self.http.delete(&url);
        self.send_ignoring_missing(request, Method::DELETE, &url).await
    }

    async fn list_files(&self, resource: Resource, id: &str) -> Result<Vec<FileEntry>, AppError> {
        let url = self.files_url(resource, id);
        let request = self.http.get(&url);
        match self.send(request, Method::GET, &url).await? {
            Value::Null => Ok(Vec::new()),
            // Some collections page their files, others return a bare array.
            value @ Value::Object(_) => {
                let page: Page<FileEntry> = serde_json::from_value(value)?;
                Ok(page.results)
            }
            value => Ok(serde_json::from_value(value)?),
        }
    }

    async fn upload_file(
        &self,
        resource: Resource,
        id: &str,
        path: &Path,
    ) -> Result<FileEntry, AppError> {
        let url = self.files_url(resource, id);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AppError::new(
                    ErrorCategory::ValidationError,
                    format!("'{}' is not a file path", path.display()),
                )
            })?;
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::from(e).with_context("path", path.display().to_string())
        })?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);
        let request = self.http.post(&url).multipart(form);
        let value = self.send(request, Method::POST, &url).await?;
        tracing::info!("Uploaded {} to {} {}", file_name, resource, id);
        if value.is_null() {
            return Err(AppError::new(
                ErrorCategory::CollaboratorError,
                format!("upload of '{}' returned no file entry", file_name),
            )
            .with_code("EMPTY_UPLOAD_RESPONSE"));
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn delete_file(
        &self,
        resource: Resource,
        id: &str,
        file_id: &str,
    ) -> Result<(), AppError> {
        let (id, file_id) = (encode_segment(id), encode_segment(file_id));
        let url = self.url(&[
            resource.scope(),
            resource.collection(),
            &id,
            "files",
            &file_id,
        ]);
        let request = self.http.delete(&url);
        self.send_ignoring_missing(request, Method::DELETE, &url).await
    }

    async fn list_tags(&self, resource: Resource) -> Result<Vec<Tag>, AppError> {
        let url = self.tags_url(resource);
        let request = self.http.get(&url);
        match self.send(request, Method::GET, &url).await? {
            Value::Null => Ok(Vec::new()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    async fn create_tag(&self, resource: Resource, tag: &Tag) -> Result<Tag, AppError> {
        let url = self.tags_url(resource);
        let request = self.http.post(&url).json(tag);
        match self.send(request, Method::POST, &url).await? {
            Value::Null => Ok(tag.clone()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    async fn update_tag(
        &self,
        resource: Resource,
        tag_id: &str,
        tag: &Tag,
    ) -> Result<Tag, AppError> {
        let encoded = encode_segment(tag_id);
        let url = self.url(&[resource.scope(), "tags", &encoded]);
        let request = self.http.put(&url).json(tag);
        match self.send(request, Method::PUT, &url).await? {
            Value::Null => Ok(tag.clone()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    async fn delete_tag(&self, resource: Resource, tag_id: &str) -> Result<(), AppError> {
        let encoded = encode_segment(tag_id);
        let url = self.url(&[resource.scope(), "tags", &encoded]);
        let request = self.http.delete(&url);
        self.send_ignoring_missing(request, Method::DELETE, &url).await
    }
}

fn status_error(status: StatusCode, method: &Method, url: &str, body: &str) -> AppError {
    let category = if status == StatusCode::NOT_FOUND {
        ErrorCategory::NotFound
    } else {
        ErrorCategory::CollaboratorError
    };
    let reason = status.canonical_reason().unwrap_or("unexpected status");
    let mut error = AppError::new(
        category,
        format!("{} {} returned {} {}", method, url, status.as_u16(), reason),
    )
    .with_code(format!("HTTP_{}", status.as_u16()))
    .with_context("status", status.as_str())
    .with_context("method", method.as_str())
    .with_context("url", url);
    if !body.trim().is_empty() {
        error.add_context("body", &excerpt(body));
    }
    if status.is_server_error() {
        error = error.with_suggestion("The platform reported an internal failure; retry later");
    }
    error
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT_ENCODE_SET).to_string()
}

fn join_path(base: &reqwest::Url, segments: &[&str]) -> String {
    let mut url = base.as_str().trim_end_matches('/').to_string();
    for segment in segments {
        if !segment.is_empty() {
            url.push('/');
            url.push_str(segment);
        }
    }
    url
}
