use crate::core::catalog::{OperatorTemplate, ParamKind, ParamSpec};
use crate::core::pipeline::editor;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Errors raised while assembling a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate operator template registered: {0}")]
    Duplicate(String),
    #[error("operator template '{template}' has an invalid parameter '{param}': {reason}")]
    InvalidParam {
        template: String,
        param: String,
        reason: String,
    },
    #[error("operator template id must not be empty")]
    EmptyId,
    #[error("failed to load catalog {path}: {message}")]
    Load { path: String, message: String },
}

/// Builder used to register operator templates before the catalog is frozen.
#[derive(Default)]
pub struct CatalogBuilder {
    templates: Vec<OperatorTemplate>,
    index: HashMap<String, usize>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, template: OperatorTemplate) -> Result<&mut Self, CatalogError> {
        if template.id.trim().is_empty() {
            return Err(CatalogError::EmptyId);
        }
        if self.index.contains_key(&template.id) {
            return Err(CatalogError::Duplicate(template.id));
        }
        for (key, spec) in &template.params {
            validate_spec(spec).map_err(|reason| CatalogError::InvalidParam {
                template: template.id.clone(),
                param: key.clone(),
                reason,
            })?;
        }
        self.index.insert(template.id.clone(), self.templates.len());
        self.templates.push(template);
        Ok(self)
    }

    pub fn build(self) -> Catalog {
        Catalog {
            templates: Arc::new(self.templates),
            index: Arc::new(self.index),
        }
    }
}

fn validate_spec(spec: &ParamSpec) -> Result<(), String> {
    match spec.kind {
        ParamKind::Select | ParamKind::Radio | ParamKind::Checkbox => {
            if spec.options.is_empty() {
                return Err(format!("{} parameters require options", spec.kind));
            }
        }
        ParamKind::Range => {
            let (min, max) = match (spec.min, spec.max) {
                (Some(min), Some(max)) => (min, max),
                _ => return Err("range parameters require min and max".to_string()),
            };
            if !min.is_finite() || !max.is_finite() {
                return Err(format!("bounds must be finite, got [{}, {}]", min, max));
            }
            if min > max {
                return Err(format!("min {} exceeds max {}", min, max));
            }
            if let Some(step) = spec.step {
                if !step.is_finite() || step <= 0.0 {
                    return Err(format!("step must be positive and finite, got {}", step));
                }
            }
        }
        ParamKind::Input => {}
    }
    let coerced = editor::coerce(spec, &spec.default_value.to_json())
        .map_err(|e| format!("default value rejected: {}", e))?;
    if coerced != spec.default_value {
        return Err(format!(
            "default value {} is not in canonical form {}",
            spec.default_value, coerced
        ));
    }
    Ok(())
}

/// Immutable, cheaply clonable set of operator templates in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: Arc<Vec<OperatorTemplate>>,
    index: Arc<HashMap<String, usize>>,
}

#[derive(Deserialize)]
struct CatalogFile {
    operators: Vec<OperatorTemplate>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    pub fn from_templates(
        templates: impl IntoIterator<Item = OperatorTemplate>,
    ) -> Result<Self, CatalogError> {
        let mut builder = CatalogBuilder::new();
        for template in templates {
            builder.register(template)?;
        }
        Ok(builder.build())
    }

    /// Parse a YAML document of the form `operators: [...]`.
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(content).map_err(|e| CatalogError::Load {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        Self::from_templates(file.operators)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file: CatalogFile = serde_yaml::from_str(&content).map_err(|e| CatalogError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let catalog = Self::from_templates(file.operators)?;
        tracing::info!(path = %path.display(), operators = catalog.len(), "loaded operator catalog");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&OperatorTemplate> {
        self.index.get(id).map(|&i| &self.templates[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperatorTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Position of a template in registration order; the stable tiebreaker for sorting.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }
}
