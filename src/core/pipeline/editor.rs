//! Parameter editor: typed coercion of raw widget input into stored values.

use crate::core::catalog::{Catalog, OperatorTemplate, ParamKind, ParamOption, ParamSpec, ParamValue};
use crate::core::pipeline::{OperatorInstance, PipelineList};
use indexmap::IndexSet;
use serde::Serialize;
use serde_json::Value;

/// Raw input rejected by a parameter's kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("{kind} parameter expects {expected}, got {found}")]
    TypeMismatch {
        kind: ParamKind,
        expected: &'static str,
        found: String,
    },
    #[error("'{0}' is not one of the allowed options")]
    UnknownOption(String),
    #[error("range parameter is missing min or max")]
    MissingBounds,
    #[error("'{0}' is not a finite number")]
    NotANumber(String),
}

/// Coerce raw widget input into the stored representation for `spec`.
///
/// * `input`: strings pass through, numbers and booleans are stringified.
/// * `select` / `radio`: the value must be one of the options.
/// * `checkbox`: a list of option values, deduplicated in first-seen order.
/// * `range`: a number clamped to `[min, max]` and snapped to the step grid anchored at `min`.
pub fn coerce(spec: &ParamSpec, raw: &Value) -> Result<ParamValue, ParamError> {
    match spec.kind {
        ParamKind::Input => match raw {
            Value::String(s) => Ok(ParamValue::Text(s.clone())),
            Value::Number(n) => Ok(ParamValue::Text(n.to_string())),
            Value::Bool(b) => Ok(ParamValue::Text(b.to_string())),
            Value::Null => Ok(ParamValue::Text(String::new())),
            other => Err(mismatch(spec.kind, "a string", other)),
        },
        ParamKind::Select | ParamKind::Radio => {
            let value = scalar_text(raw).ok_or_else(|| mismatch(spec.kind, "a scalar", raw))?;
            if spec.has_option(&value) {
                Ok(ParamValue::Text(value))
            } else {
                Err(ParamError::UnknownOption(value))
            }
        }
        ParamKind::Checkbox => {
            let items: Vec<&Value> = match raw {
                Value::Array(items) => items.iter().collect(),
                Value::Null => Vec::new(),
                scalar @ (Value::String(_) | Value::Number(_)) => vec![scalar],
                other => return Err(mismatch(spec.kind, "a list of options", other)),
            };
            let mut selected = IndexSet::new();
            for item in items {
                let value =
                    scalar_text(item).ok_or_else(|| mismatch(spec.kind, "option values", item))?;
                if !spec.has_option(&value) {
                    return Err(ParamError::UnknownOption(value));
                }
                selected.insert(value);
            }
            Ok(ParamValue::List(selected.into_iter().collect()))
        }
        ParamKind::Range => {
            let (min, max) = match (spec.min, spec.max) {
                (Some(min), Some(max)) => (min, max),
                _ => return Err(ParamError::MissingBounds),
            };
            let number = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or_else(|| ParamError::NotANumber(raw.to_string()))?;
            Ok(ParamValue::Number(snap_to_step(number, min, max, spec.step)))
        }
    }
}

fn mismatch(kind: ParamKind, expected: &'static str, found: &Value) -> ParamError {
    ParamError::TypeMismatch {
        kind,
        expected,
        found: found.to_string(),
    }
}

fn scalar_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn snap_to_step(value: f64, min: f64, max: f64, step: Option<f64>) -> f64 {
    let clamped = value.clamp(min, max);
    let Some(step) = step.filter(|s| *s > 0.0) else {
        return clamped;
    };
    let mut snapped = min + ((clamped - min) / step).round() * step;
    if snapped > max {
        snapped -= step;
    }
    let scale = 10f64.powi(decimal_places(step).max(decimal_places(min)) as i32);
    (snapped * scale).round() / scale
}

fn decimal_places(value: f64) -> usize {
    let text = value.to_string();
    text.split_once('.').map(|(_, frac)| frac.len().min(10)).unwrap_or(0)
}

/// An instance needs configuration when any `input` parameter is blank or any
/// `checkbox` parameter has nothing selected. Recomputed on every call.
pub fn needs_configuration(instance: &OperatorInstance, template: &OperatorTemplate) -> bool {
    template.params.iter().any(|(key, spec)| {
        let value = instance.param(key);
        match spec.kind {
            ParamKind::Input => value
                .and_then(ParamValue::as_text)
                .map(|s| s.trim().is_empty())
                .unwrap_or(true),
            ParamKind::Checkbox => value
                .and_then(ParamValue::as_list)
                .map(|items| items.is_empty())
                .unwrap_or(true),
            _ => false,
        }
    })
}

/// Presentation-free description of one form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub key: String,
    pub label: String,
    pub kind: ParamKind,
    pub value: ParamValue,
    pub options: Vec<ParamOption>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub description: Option<String>,
    pub missing: bool,
}

/// Form model for `instance`, in schema order.
pub fn render(instance: &OperatorInstance, template: &OperatorTemplate) -> Vec<FieldView> {
    template
        .params
        .iter()
        .map(|(key, spec)| {
            let value = instance
                .param(key)
                .cloned()
                .unwrap_or_else(|| spec.default_value.clone());
            let missing = match (&spec.kind, &value) {
                (ParamKind::Input, ParamValue::Text(s)) => s.trim().is_empty(),
                (ParamKind::Checkbox, ParamValue::List(items)) => items.is_empty(),
                _ => false,
            };
            FieldView {
                key: key.clone(),
                label: spec.label.clone(),
                kind: spec.kind,
                value,
                options: spec.options.clone(),
                min: spec.min,
                max: spec.max,
                step: spec.step,
                description: spec.description.clone(),
                missing,
            }
        })
        .collect()
}

/// Writes coerced edits back into a pipeline list.
pub struct ParameterEditor<'a> {
    catalog: &'a Catalog,
}

impl<'a> ParameterEditor<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Form for the selected entry; `None` when the entry or its template is gone.
    pub fn render(&self, list: &PipelineList, id: impl AsRef<str>) -> Option<Vec<FieldView>> {
        let instance = list.get(id)?;
        let template = self.catalog.get(instance.template_id())?;
        Some(render(instance, template))
    }

    /// Coerce `raw` and store it.
    ///
    /// `Ok(false)` means nothing was addressed (stale instance or unknown key).
    /// A rejected value returns `Err` and leaves the entry unchanged.
    pub fn on_change(
        &self,
        list: &mut PipelineList,
        id: impl AsRef<str>,
        key: &str,
        raw: &Value,
    ) -> Result<bool, ParamError> {
        let id = id.as_ref();
        let Some(spec) = self.spec_for(list, id, key) else {
            return Ok(false);
        };
        let value = coerce(spec, raw)?;
        Ok(list.update_param(id, key, value))
    }

    /// Check or uncheck a single checkbox option with set semantics.
    pub fn set_option_checked(
        &self,
        list: &mut PipelineList,
        id: impl AsRef<str>,
        key: &str,
        option: &str,
        checked: bool,
    ) -> Result<bool, ParamError> {
        let id = id.as_ref();
        let Some(spec) = self.spec_for(list, id, key) else {
            return Ok(false);
        };
        if spec.kind != ParamKind::Checkbox {
            return Err(ParamError::TypeMismatch {
                kind: spec.kind,
                expected: "a checkbox parameter",
                found: option.to_string(),
            });
        }
        let mut current: Vec<String> = list
            .get(id)
            .and_then(|instance| instance.param(key))
            .and_then(ParamValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        if checked {
            current.push(option.to_string());
        } else {
            current.retain(|value| value != option);
        }
        let value = coerce(spec, &serde_json::json!(current))?;
        Ok(list.update_param(id, key, value))
    }

    fn spec_for(&self, list: &PipelineList, id: &str, key: &str) -> Option<&'a ParamSpec> {
        let instance = list.get(id)?;
        self.catalog.get(instance.template_id())?.params.get(key)
    }
}
