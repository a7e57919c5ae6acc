#![allow(clippy::result_large_err)]

//! Linear multi-step wizards gating progression on per-step validity.
//!
//! Each flow names its steps with an enum and lists them in [`WizardFlow::STEPS`].
//! The wizard derives step indices and bounds from that list.

pub mod cleansing;
pub mod dataset;
pub mod ratio;

pub use cleansing::{CleansingBasicInfo, CleansingStep, CleansingTaskFlow, CleansingTaskRequest};
pub use dataset::{
    DatasetBasicInfo, DatasetCreateFlow, DatasetCreateRequest, DatasetStep, DatasetType,
    ImportConfig, ImportSource,
};
pub use ratio::{RatioAllocation, RatioStep, RatioTaskFlow, RatioTaskRequest};

use crate::api::{EntityApi, Resource};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One field-level problem found while validating a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Step data and submission shape of one wizard.
pub trait WizardFlow {
    type Step: Copy + Eq + fmt::Debug + fmt::Display + 'static;
    type Output: Serialize;

    /// Steps in navigation order. Must not be empty.
    const STEPS: &'static [Self::Step];

    /// Collection the assembled object is created in.
    fn resource(&self) -> Resource;

    /// Validate the data owned by `step` only.
    fn validate_step(&self, step: Self::Step) -> Vec<ValidationIssue>;

    /// Build the object handed to the create collaborator.
    fn assemble(&self, created_at: DateTime<Utc>) -> Self::Output;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase<S> {
    Editing(S),
    Submitting,
    Submitted,
}

/// Linear step controller owning one flow's state.
pub struct Wizard<F: WizardFlow> {
    flow: F,
    phase: WizardPhase<F::Step>,
    created: Option<Value>,
}

impl<F: WizardFlow> Wizard<F> {
    pub fn new(flow: F) -> Self {
        Self {
            flow,
            phase: WizardPhase::Editing(F::STEPS[0]),
            created: None,
        }
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    /// Mutable step data; only available while editing.
    pub fn flow_mut(&mut self) -> Option<&mut F> {
        match self.phase {
            WizardPhase::Editing(_) => Some(&mut self.flow),
            _ => None,
        }
    }

    pub fn phase(&self) -> WizardPhase<F::Step> {
        self.phase
    }

    pub fn current_step(&self) -> Option<F::Step> {
        match self.phase {
            WizardPhase::Editing(step) => Some(step),
            _ => None,
        }
    }

    pub fn step_index(&self) -> Option<usize> {
        let step = self.current_step()?;
        F::STEPS.iter().position(|s| *s == step)
    }

    pub fn step_count(&self) -> usize {
        F::STEPS.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index() == Some(F::STEPS.len() - 1)
    }

    pub fn validate_step(&self, step: F::Step) -> Vec<ValidationIssue> {
        self.flow.validate_step(step)
    }

    pub fn is_step_valid(&self, step: F::Step) -> bool {
        self.flow.validate_step(step).is_empty()
    }

    /// Advance one step. No-op when the current step is invalid or already last.
    pub fn next(&mut self) -> bool {
        let Some(index) = self.step_index() else {
            return false;
        };
        let step = F::STEPS[index];
        if index + 1 >= F::STEPS.len() || !self.is_step_valid(step) {
            return false;
        }
        self.phase = WizardPhase::Editing(F::STEPS[index + 1]);
        tracing::debug!(from = %step, to = %F::STEPS[index + 1], "wizard advanced");
        true
    }

    /// Go back one step. Always allowed except on the first step.
    pub fn prev(&mut self) -> bool {
        match self.step_index() {
            Some(index) if index > 0 => {
                self.phase = WizardPhase::Editing(F::STEPS[index - 1]);
                true
            }
            _ => false,
        }
    }

    /// Issues across every step, in step order.
    pub fn all_issues(&self) -> Vec<(F::Step, ValidationIssue)> {
        F::STEPS
            .iter()
            .flat_map(|step| {
                self.flow
                    .validate_step(*step)
                    .into_iter()
                    .map(move |issue| (*step, issue))
            })
            .collect()
    }

    pub fn can_submit(&self) -> bool {
        self.is_last_step() && self.all_issues().is_empty()
    }

    /// Assemble the payload and enter `Submitting`.
    ///
    /// Rejected while a submission is already in flight, outside the last step,
    /// or when any step is invalid.
    pub fn begin_submit(&mut self, created_at: DateTime<Utc>) -> Result<F::Output, AppError> {
        match self.phase {
            WizardPhase::Submitting => {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "a submission is already in progress",
                )
                .with_code("WIZARD_BUSY"))
            }
            WizardPhase::Submitted => {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "wizard has already been submitted",
                )
                .with_code("WIZARD_DONE"))
            }
            WizardPhase::Editing(_) if !self.is_last_step() => {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "submit is only available on the last step",
                )
                .with_code("WIZARD_NOT_LAST_STEP"))
            }
            WizardPhase::Editing(_) => {}
        }
        let issues = self.all_issues();
        if !issues.is_empty() {
            let mut error = AppError::new(
                ErrorCategory::ValidationError,
                format!("{} field(s) need attention before submitting", issues.len()),
            )
            .with_code("WIZARD_INVALID");
            for (step, issue) in &issues {
                error.add_context(&format!("{}.{}", step, issue.field), &issue.message);
            }
            return Err(error);
        }
        self.phase = WizardPhase::Submitting;
        Ok(self.flow.assemble(created_at))
    }

    /// Record the collaborator outcome of a submission started by [`Wizard::begin_submit`].
    ///
    /// Failure returns to the last step with all data intact.
    pub fn complete_submit(&mut self, outcome: Result<Value, AppError>) -> Result<Value, AppError> {
        if self.phase != WizardPhase::Submitting {
            return Err(AppError::new(
                ErrorCategory::InternalError,
                "no submission in progress",
            ));
        }
        match outcome {
            Ok(created) => {
                self.phase = WizardPhase::Submitted;
                self.created = Some(created.clone());
                Ok(created)
            }
            Err(err) => {
                self.phase = WizardPhase::Editing(F::STEPS[F::STEPS.len() - 1]);
                tracing::warn!("submission failed, wizard kept on last step: {}", err);
                Err(err)
            }
        }
    }

    /// Validate, create through `api`, and record the outcome.
    pub async fn submit(&mut self, api: &dyn EntityApi) -> Result<Value, AppError> {
        let body = match serde_json::to_value(self.begin_submit(Utc::now())?) {
            Ok(body) => body,
            Err(err) => return self.complete_submit(Err(err.into())),
        };
        let resource = self.flow.resource();
        let outcome = api.create(resource, body).await;
        if outcome.is_ok() {
            tracing::info!(resource = %resource, "wizard submitted");
        }
        self.complete_submit(outcome)
    }

    /// Entity echoed by the collaborator after a successful submission.
    pub fn created(&self) -> Option<&Value> {
        self.created.as_ref()
    }

    pub fn into_flow(self) -> F {
        self.flow
    }
}

pub(crate) fn require_text(issues: &mut Vec<ValidationIssue>, field: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(field, "is required"));
    }
}
