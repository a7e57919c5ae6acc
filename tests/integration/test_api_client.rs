use datamate_console::api::{
    create_dataset_with_uploads, upload_all, EntityApi, HttpApiClient, ListQuery, Resource, Tag,
    UploadCanceller,
};
use datamate_console::core::catalog::builtin_catalog;
use datamate_console::core::config::ApiConfig;
use datamate_console::core::types::ErrorCategory;
use datamate_console::core::wizard::{
    CleansingStep, CleansingTaskFlow, DatasetCreateFlow, ImportConfig, ImportSource, Wizard,
    WizardPhase,
};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpApiClient {
    let config = ApiConfig {
        base_url: format!("{}/api", server.uri()),
        timeout_seconds: 10,
        page_size: 20,
    };
    HttpApiClient::new(&config).expect("client should build")
}

fn write_files(dir: &TempDir, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, format!("contents of {}", name)).unwrap();
            path
        })
        .collect()
}

#[tokio::test]
async fn test_list_sends_filters_and_decodes_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data-management/datasets"))
        .and(query_param("keyword", "news"))
        .and(query_param("tags", "nlp,zh"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "name": "news-2024"}],
            "totalElements": 11
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = ListQuery {
        keyword: Some("news".into()),
        tags: vec!["nlp".into(), "zh".into()],
        ..ListQuery::page(1, 10)
    };
    let page = client.list(Resource::Datasets, &query).await.unwrap();
    assert_eq!(page.total_elements, 11);
    assert_eq!(page.results[0]["name"], "news-2024");
}

#[tokio::test]
async fn test_create_echoes_entity_or_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/synthesis/ratio-tasks"))
        .and(body_partial_json(json!({"name": "mix"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "r-1", "name": "mix"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/annotation/tasks"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client
        .create(Resource::RatioTasks, json!({"name": "mix"}))
        .await
        .unwrap();
    assert_eq!(created["id"], "r-1");

    let empty = client
        .create(Resource::AnnotationTasks, json!({"name": "label"}))
        .await
        .unwrap();
    assert!(empty.is_null());
}

#[tokio::test]
async fn test_error_status_is_carried_in_context() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/knowledge-base/bases/kb-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cleaning/tasks/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .update(Resource::KnowledgeBases, "kb-1", json!({"name": "kb"}))
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::CollaboratorError);
    assert_eq!(err.http_status(), Some(500));
    assert_eq!(
        err.context.get("body").map(String::as_str),
        Some("database unavailable")
    );
    assert!(err.is_retryable());

    let missing = client
        .get(Resource::CleansingTasks, "missing")
        .await
        .unwrap_err();
    assert_eq!(missing.category, ErrorCategory::NotFound);
    assert_eq!(missing.http_status(), Some(404));
}

#[tokio::test]
async fn test_delete_of_missing_entity_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/data-management/datasets/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/data-management/datasets/locked"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.delete(Resource::Datasets, "gone").await.is_ok());
    let err = client
        .delete(Resource::Datasets, "locked")
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), Some(409));
}

#[tokio::test]
async fn test_tags_live_under_scope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data-management/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "nlp", "color": "#00f"},
            {"id": "t-2", "name": "zh"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cleaning/tags"))
        .and(body_partial_json(json!({"name": "urgent"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "urgent"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let tags = client.list_tags(Resource::Datasets).await.unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].id.as_deref(), Some("1"));
    assert_eq!(tags[1].color, None);

    let created = client
        .create_tag(Resource::CleansingTasks, &Tag::named("urgent"))
        .await
        .unwrap();
    assert_eq!(created.id.as_deref(), Some("7"));
}

#[tokio::test]
async fn test_upload_file_sends_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/data-management/datasets/ds-1/files"))
        .and(body_string_contains("filename=\"corpus.jsonl\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9, "fileName": "corpus.jsonl", "fileSize": 27
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let files = write_files(&dir, &["corpus.jsonl"]);
    let client = client_for(&server);
    let entry = client
        .upload_file(Resource::Datasets, "ds-1", &files[0])
        .await
        .unwrap();
    assert_eq!(entry.id, "9");
    assert_eq!(entry.file_name, "corpus.jsonl");
}

#[tokio::test]
async fn test_upload_all_continues_past_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/data-management/datasets/ds-1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "fileName": "f"})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut files = write_files(&dir, &["a.txt", "b.txt"]);
    files.insert(1, dir.path().join("missing.txt"));

    let client = client_for(&server);
    let report = upload_all(&client, Resource::Datasets, "ds-1", &files, &UploadCanceller::new()).await;
    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, files[1]);
    assert_eq!(report.failed[0].error.category, ErrorCategory::IoError);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_upload_all_can_be_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/data-management/datasets/ds-1/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1, "fileName": "f"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let files = write_files(&dir, &["a.txt", "b.txt", "c.txt"]);
    let client = client_for(&server);

    let canceller = UploadCanceller::new();
    let trigger = canceller.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let report = upload_all(&client, Resource::Datasets, "ds-1", &files, &canceller).await;
    assert!(report.cancelled);
    assert!(report.uploaded.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].error.category, ErrorCategory::Cancelled);
    assert_eq!(report.skipped, files[1..].to_vec());
    assert_eq!(report.retryable_paths(), files);
}

#[tokio::test]
async fn test_dataset_creation_reports_partial_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/data-management/datasets"))
        .and(body_partial_json(json!({
            "name": "corpus",
            "datasetType": "TEXT",
            "importSource": {"kind": "LOCAL_UPLOAD"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "name": "corpus"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/data-management/datasets/42/files"))
        .and(body_string_contains("good.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "fileName": "good.txt"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/data-management/datasets/42/files"))
        .and(body_string_contains("bad.txt"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let files = write_files(&dir, &["good.txt", "bad.txt"]);

    let mut flow = DatasetCreateFlow::new();
    flow.basic.name = "corpus".into();
    flow.import.replace(ImportConfig {
        source: ImportSource::LocalUpload,
        files: files.clone(),
    });
    let mut wizard = Wizard::new(flow);
    assert!(wizard.next());

    let client = client_for(&server);
    let outcome = create_dataset_with_uploads(&mut wizard, &client, &UploadCanceller::new())
        .await
        .unwrap();

    assert_eq!(outcome.dataset_id, "42");
    assert!(!outcome.is_complete());
    assert_eq!(outcome.uploads.uploaded.len(), 1);
    assert_eq!(outcome.uploads.failed[0].error.http_status(), Some(413));
    assert_eq!(outcome.uploads.retryable_paths(), vec![files[1].clone()]);
    assert_eq!(wizard.phase(), WizardPhase::Submitted);
}

#[tokio::test]
async fn test_failed_create_keeps_wizard_editable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cleaning/tasks"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = builtin_catalog();
    let mut flow = CleansingTaskFlow::new(catalog.clone());
    flow.basic.name = "cleanup".into();
    flow.basic.source_dataset_id = "ds-1".into();
    flow.basic.destination.update(|old| {
        let mut next = old.clone();
        next.name = "out".into();
        next
    });
    flow.pipeline.add(catalog.get("text-dedup").unwrap());
    let mut wizard = Wizard::new(flow);
    assert!(wizard.next());

    let client = client_for(&server);
    let err = wizard.submit(&client).await.unwrap_err();
    assert_eq!(err.http_status(), Some(503));
    assert_eq!(wizard.phase(), WizardPhase::Editing(CleansingStep::Operators));
    assert_eq!(wizard.flow().pipeline.len(), 1);
    assert!(wizard.can_submit());
}
