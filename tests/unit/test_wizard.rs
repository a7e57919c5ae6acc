use async_trait::async_trait;
use chrono::Utc;
use datamate_console::api::{EntityApi, FileEntry, ListQuery, Page, Resource, Tag};
use datamate_console::core::catalog::builtin_catalog;
use datamate_console::core::error::AppError;
use datamate_console::core::types::ErrorCategory;
use datamate_console::core::wizard::{
    CleansingStep, CleansingTaskFlow, RatioStep, RatioTaskFlow, Wizard, WizardPhase,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Mutex;

/// In-memory collaborator recording create calls.
#[derive(Default)]
struct RecordingApi {
    fail_with: Option<u16>,
    created: Mutex<Vec<(Resource, Value)>>,
}

impl RecordingApi {
    fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(Resource, Value)> {
        self.created.lock().unwrap().clone()
    }
}

fn unsupported() -> AppError {
    AppError::new(ErrorCategory::InternalError, "not used by this test")
}

#[async_trait]
impl EntityApi for RecordingApi {
    async fn list(&self, _: Resource, _: &ListQuery) -> Result<Page<Value>, AppError> {
        Err(unsupported())
    }

    async fn get(&self, _: Resource, _: &str) -> Result<Value, AppError> {
        Err(unsupported())
    }

    async fn create(&self, resource: Resource, body: Value) -> Result<Value, AppError> {
        self.created.lock().unwrap().push((resource, body.clone()));
        match self.fail_with {
            Some(status) => Err(AppError::new(ErrorCategory::CollaboratorError, "rejected")
                .with_context("status", status.to_string())),
            None => Ok(json!({"id": "task-1", "name": body["name"]})),
        }
    }

    async fn update(&self, _: Resource, _: &str, _: Value) -> Result<Value, AppError> {
        Err(unsupported())
    }

    async fn delete(&self, _: Resource, _: &str) -> Result<(), AppError> {
        Err(unsupported())
    }

    async fn list_files(&self, _: Resource, _: &str) -> Result<Vec<FileEntry>, AppError> {
        Err(unsupported())
    }

    async fn upload_file(&self, _: Resource, _: &str, _: &Path) -> Result<FileEntry, AppError> {
        Err(unsupported())
    }

    async fn delete_file(&self, _: Resource, _: &str, _: &str) -> Result<(), AppError> {
        Err(unsupported())
    }

    async fn list_tags(&self, _: Resource) -> Result<Vec<Tag>, AppError> {
        Err(unsupported())
    }

    async fn create_tag(&self, _: Resource, _: &Tag) -> Result<Tag, AppError> {
        Err(unsupported())
    }

    async fn update_tag(&self, _: Resource, _: &str, _: &Tag) -> Result<Tag, AppError> {
        Err(unsupported())
    }

    async fn delete_tag(&self, _: Resource, _: &str) -> Result<(), AppError> {
        Err(unsupported())
    }
}

fn cleansing_wizard() -> Wizard<CleansingTaskFlow> {
    Wizard::new(CleansingTaskFlow::new(builtin_catalog()))
}

fn fill_basic_info(wizard: &mut Wizard<CleansingTaskFlow>) {
    let flow = wizard.flow_mut().unwrap();
    flow.basic.name = "news cleanup".into();
    flow.basic.source_dataset_id = "ds-1".into();
    flow.basic.destination.update(|old| {
        let mut next = old.clone();
        next.name = "news-clean".into();
        next
    });
}

fn add_operator(wizard: &mut Wizard<CleansingTaskFlow>, id: &str) {
    let flow = wizard.flow_mut().unwrap();
    let template = flow.catalog().get(id).unwrap().clone();
    flow.pipeline.add(&template);
}

fn ready_wizard() -> Wizard<CleansingTaskFlow> {
    let mut wizard = cleansing_wizard();
    fill_basic_info(&mut wizard);
    assert!(wizard.next());
    add_operator(&mut wizard, "html-tag-removal");
    wizard
}

#[test]
fn test_next_is_noop_on_invalid_step() {
    let mut wizard = cleansing_wizard();
    assert!(!wizard.next());
    assert_eq!(wizard.current_step(), Some(CleansingStep::BasicInfo));
    assert_eq!(wizard.step_index(), Some(0));
}

#[test]
fn test_next_is_noop_on_last_step_and_prev_is_free() {
    let mut wizard = ready_wizard();
    assert!(wizard.is_last_step());
    assert!(!wizard.next());
    assert_eq!(wizard.current_step(), Some(CleansingStep::Operators));

    assert!(wizard.prev());
    assert_eq!(wizard.current_step(), Some(CleansingStep::BasicInfo));
    assert!(!wizard.prev());
}

#[test]
fn test_prev_is_allowed_from_invalid_step() {
    let mut wizard = cleansing_wizard();
    fill_basic_info(&mut wizard);
    assert!(wizard.next());
    assert!(!wizard.is_step_valid(CleansingStep::Operators));
    assert!(wizard.prev());
}

#[test]
fn test_submit_rejected_before_last_step() {
    let mut wizard = cleansing_wizard();
    fill_basic_info(&mut wizard);
    let err = wizard.begin_submit(Utc::now()).unwrap_err();
    assert_eq!(err.code, "WIZARD_NOT_LAST_STEP");
    assert_eq!(wizard.phase(), WizardPhase::Editing(CleansingStep::BasicInfo));
}

#[test]
fn test_submit_rejected_with_unconfigured_operator() {
    let mut wizard = ready_wizard();
    add_operator(&mut wizard, "file-export");
    assert!(!wizard.can_submit());

    let err = wizard.begin_submit(Utc::now()).unwrap_err();
    assert_eq!(err.code, "WIZARD_INVALID");
    assert!(err.context.keys().any(|k| k.starts_with("operators.file-export#")));
    assert!(!err.context.keys().any(|k| k.starts_with("operators.operators.")));
}

#[test]
fn test_submit_rechecks_earlier_steps() {
    let mut wizard = ready_wizard();
    assert!(wizard.is_step_valid(CleansingStep::Operators));
    wizard.flow_mut().unwrap().basic.name.clear();

    assert!(!wizard.is_step_valid(CleansingStep::BasicInfo));
    assert!(!wizard.can_submit());
    let err = wizard.begin_submit(Utc::now()).unwrap_err();
    assert_eq!(err.code, "WIZARD_INVALID");
    assert!(err.context.contains_key("basic_info.name"));
    assert_eq!(err.context.len(), 1);
    assert_eq!(wizard.phase(), WizardPhase::Editing(CleansingStep::Operators));
}

#[test]
fn test_begin_submit_blocks_duplicates_and_editing() {
    let mut wizard = ready_wizard();
    let request = wizard.begin_submit(Utc::now()).unwrap();
    assert_eq!(request.operators.len(), 1);
    assert_eq!(wizard.phase(), WizardPhase::Submitting);
    assert!(wizard.flow_mut().is_none());

    let err = wizard.begin_submit(Utc::now()).unwrap_err();
    assert_eq!(err.code, "WIZARD_BUSY");
}

#[test]
fn test_failed_completion_returns_to_last_step_with_data() {
    let mut wizard = ready_wizard();
    wizard.begin_submit(Utc::now()).unwrap();
    let failure = AppError::new(ErrorCategory::CollaboratorError, "boom");
    assert!(wizard.complete_submit(Err(failure)).is_err());

    assert_eq!(wizard.phase(), WizardPhase::Editing(CleansingStep::Operators));
    assert_eq!(wizard.flow().basic.name, "news cleanup");
    assert_eq!(wizard.flow().pipeline.len(), 1);
    assert!(wizard.can_submit());
}

#[tokio::test]
async fn test_submit_posts_assembled_request() {
    let api = RecordingApi::default();
    let mut wizard = ready_wizard();

    let created = wizard.submit(&api).await.unwrap();
    assert_eq!(created["id"], "task-1");
    assert_eq!(wizard.phase(), WizardPhase::Submitted);
    assert_eq!(wizard.created(), Some(&created));

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    let (resource, body) = &calls[0];
    assert_eq!(*resource, Resource::CleansingTasks);
    assert_eq!(body["srcDatasetId"], "ds-1");
    assert_eq!(body["destDatasetName"], "news-clean");
    assert_eq!(body["operators"][0]["operatorId"], "html-tag-removal");
    assert!(body["createdAt"].is_string());

    let err = wizard.submit(&api).await.unwrap_err();
    assert_eq!(err.code, "WIZARD_DONE");
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn test_submit_failure_preserves_state() {
    let api = RecordingApi::failing(500);
    let mut wizard = ready_wizard();

    let err = wizard.submit(&api).await.unwrap_err();
    assert_eq!(err.http_status(), Some(500));
    assert_eq!(wizard.phase(), WizardPhase::Editing(CleansingStep::Operators));
    assert_eq!(wizard.flow().pipeline.len(), 1);
    assert!(wizard.created().is_none());
}

#[test]
fn test_ratio_flow_requires_exact_allocation() {
    let mut wizard = Wizard::new(RatioTaskFlow::new());
    wizard.flow_mut().unwrap().name = "mix".into();
    assert!(wizard.next());
    assert!(!wizard.next());

    let flow = wizard.flow_mut().unwrap();
    flow.select_dataset("a");
    flow.select_dataset("b");
    assert!(wizard.next());
    assert_eq!(wizard.current_step(), Some(RatioStep::Ratios));

    let flow = wizard.flow_mut().unwrap();
    flow.set_total(10);
    flow.set_allocation("a", 3);
    assert!(!flow.set_allocation("zzz", 7));
    assert!(!wizard.can_submit());

    let flow = wizard.flow_mut().unwrap();
    flow.distribute_evenly();
    assert_eq!(flow.allocation("a"), Some(5));
    assert_eq!(flow.allocated(), 10);
    assert!(wizard.can_submit());
}
