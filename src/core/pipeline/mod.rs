//! Ordered pipeline of operator instances.

pub mod editor;
pub mod versioned;

pub use editor::{coerce, needs_configuration, render, FieldView, ParamError, ParameterEditor};
pub use versioned::Versioned;

use crate::core::catalog::{Catalog, OperatorTemplate, ParamValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one pipeline entry, unique within the list that minted it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    fn mint(template_id: &str, seq: u64) -> Self {
        InstanceId(format!("{}#{}", template_id, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Independently configured copy of an operator template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorInstance {
    instance_id: InstanceId,
    template_id: String,
    params: IndexMap<String, ParamValue>,
}

impl OperatorInstance {
    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn params(&self) -> &IndexMap<String, ParamValue> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }
}

/// Operator entry in the payload handed to the create collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorConfig {
    pub operator_id: String,
    pub instance_id: InstanceId,
    pub position: usize,
    pub params: IndexMap<String, ParamValue>,
}

/// Ordered list of operator instances.
///
/// Every operation addressing an instance by id is a silent no-op when the id is
/// unknown: stale references from a render/click race must never fail.
#[derive(Debug, Clone, Default)]
pub struct PipelineList {
    entries: Vec<OperatorInstance>,
    next_seq: u64,
}

impl PipelineList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fresh instance of `template` and return a copy of it.
    pub fn add(&mut self, template: &OperatorTemplate) -> OperatorInstance {
        self.next_seq += 1;
        let instance = OperatorInstance {
            instance_id: InstanceId::mint(&template.id, self.next_seq),
            template_id: template.id.clone(),
            params: template.default_params(),
        };
        tracing::debug!(instance = %instance.instance_id, position = self.entries.len(), "operator added");
        self.entries.push(instance.clone());
        instance
    }

    pub fn remove(&mut self, id: impl AsRef<str>) -> Option<OperatorInstance> {
        let position = self.position_of(id.as_ref())?;
        let removed = self.entries.remove(position);
        tracing::debug!(instance = %removed.instance_id, "operator removed");
        Some(removed)
    }

    /// Move the entry at `from` to `to` (clamped to the last index).
    ///
    /// Returns `false` without touching the list when `from` is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.entries.len() {
            return false;
        }
        let to = to.min(self.entries.len() - 1);
        if from != to {
            let entry = self.entries.remove(from);
            self.entries.insert(to, entry);
            tracing::debug!(from, to, "operator reordered");
        }
        true
    }

    /// Replace the value stored under `key`; sibling keys are left untouched.
    ///
    /// Returns `false` when the instance or the key does not exist.
    pub fn update_param(&mut self, id: impl AsRef<str>, key: &str, value: ParamValue) -> bool {
        let Some(instance) = self.get_mut(id.as_ref()) else {
            return false;
        };
        match instance.params.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: impl AsRef<str>) -> Option<&OperatorInstance> {
        let id = id.as_ref();
        self.entries.iter().find(|e| e.instance_id.as_str() == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut OperatorInstance> {
        self.entries.iter_mut().find(|e| e.instance_id.as_str() == id)
    }

    pub fn position_of(&self, id: impl AsRef<str>) -> Option<usize> {
        let id = id.as_ref();
        self.entries.iter().position(|e| e.instance_id.as_str() == id)
    }

    pub fn instances(&self) -> &[OperatorInstance] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperatorInstance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Ids already minted stay retired.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Ids of instances whose template reports missing configuration.
    ///
    /// Instances whose template is no longer in `catalog` are reported as well.
    pub fn unconfigured<'a>(&'a self, catalog: &Catalog) -> Vec<&'a InstanceId> {
        self.entries
            .iter()
            .filter(|instance| match catalog.get(&instance.template_id) {
                Some(template) => needs_configuration(instance, template),
                None => true,
            })
            .map(|instance| &instance.instance_id)
            .collect()
    }

    pub fn to_submission(&self) -> Vec<OperatorConfig> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, instance)| OperatorConfig {
                operator_id: instance.template_id.clone(),
                instance_id: instance.instance_id.clone(),
                position,
                params: instance.params.clone(),
            })
            .collect()
    }
}
