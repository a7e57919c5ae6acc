//! Operator catalog: immutable templates that pipeline entries are copied from.

pub mod builtin;
pub mod favorites;
pub mod filter;
pub mod registry;

pub use builtin::builtin_catalog;
pub use favorites::Favorites;
pub use filter::{filter, group_by_category, CategoryFilter, FilterState, SortOrder};
pub use registry::{Catalog, CatalogBuilder, CatalogError};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operator category. The set is closed; unknown categories fail to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    DataCleaning,
    Ml,
    Vision,
    Nlp,
    Analysis,
    Transform,
    Io,
    Math,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::DataCleaning,
        Category::Ml,
        Category::Vision,
        Category::Nlp,
        Category::Analysis,
        Category::Transform,
        Category::Io,
        Category::Math,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DataCleaning => "data-cleaning",
            Category::Ml => "ml",
            Category::Vision => "vision",
            Category::Nlp => "nlp",
            Category::Analysis => "analysis",
            Category::Transform => "transform",
            Category::Io => "io",
            Category::Math => "math",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase().replace('_', "-");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| {
                format!(
                    "unknown category '{}'; expected one of {}",
                    value,
                    Category::ALL.map(|c| c.as_str()).join(", ")
                )
            })
    }
}

/// Widget kind of a parameter; decides how raw input is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Input,
    Select,
    Radio,
    Checkbox,
    Range,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Input => "input",
            ParamKind::Select => "select",
            ParamKind::Radio => "radio",
            ParamKind::Checkbox => "checkbox",
            ParamKind::Range => "range",
        };
        f.write_str(name)
    }
}

/// A stored parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert into the JSON shape accepted by the parameter editor.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Number(n) => serde_json::json!(n),
            ParamValue::Text(s) => serde_json::Value::String(s.clone()),
            ParamValue::List(items) => serde_json::json!(items),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "{:?}", s),
            ParamValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Choice offered by select, radio and checkbox parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct ParamOption {
    pub label: String,
    pub value: String,
}

impl ParamOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Plain(String),
    Full { label: Option<String>, value: String },
}

impl From<RawOption> for ParamOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Plain(value) => ParamOption::new(value.clone(), value),
            RawOption::Full { label, value } => {
                ParamOption::new(label.unwrap_or_else(|| value.clone()), value)
            }
        }
    }
}

/// Declarative description of one operator parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub label: String,
    #[serde(alias = "defaultValue", alias = "default")]
    pub default_value: ParamValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ParamOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn input(label: impl Into<String>, default: impl Into<String>) -> Self {
        Self::bare(ParamKind::Input, label, ParamValue::Text(default.into()))
    }

    pub fn select(label: impl Into<String>, options: &[&str], default: &str) -> Self {
        Self::choice(ParamKind::Select, label, options, default)
    }

    pub fn radio(label: impl Into<String>, options: &[&str], default: &str) -> Self {
        Self::choice(ParamKind::Radio, label, options, default)
    }

    pub fn checkbox(label: impl Into<String>, options: &[&str], default: &[&str]) -> Self {
        let mut spec = Self::bare(
            ParamKind::Checkbox,
            label,
            ParamValue::List(default.iter().map(|s| s.to_string()).collect()),
        );
        spec.options = options.iter().map(|o| ParamOption::new(*o, *o)).collect();
        spec
    }

    pub fn range(label: impl Into<String>, min: f64, max: f64, step: f64, default: f64) -> Self {
        let mut spec = Self::bare(ParamKind::Range, label, ParamValue::Number(default));
        spec.min = Some(min);
        spec.max = Some(max);
        spec.step = Some(step);
        spec
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    fn choice(kind: ParamKind, label: impl Into<String>, options: &[&str], default: &str) -> Self {
        let mut spec = Self::bare(kind, label, ParamValue::Text(default.to_string()));
        spec.options = options.iter().map(|o| ParamOption::new(*o, *o)).collect();
        spec
    }

    fn bare(kind: ParamKind, label: impl Into<String>, default_value: ParamValue) -> Self {
        Self {
            kind,
            label: label.into(),
            default_value,
            options: Vec::new(),
            min: None,
            max: None,
            step: None,
            description: None,
        }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Immutable catalog entry describing a configurable processing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub tags: IndexSet<String>,
    #[serde(default, alias = "isPopular")]
    pub is_popular: bool,
    #[serde(default, alias = "paramSchema")]
    pub params: IndexMap<String, ParamSpec>,
}

impl OperatorTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            version: default_version(),
            tags: IndexSet::new(),
            is_popular: false,
            params: IndexMap::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn popular(mut self) -> Self {
        self.is_popular = true;
        self
    }

    pub fn param(mut self, key: impl Into<String>, spec: ParamSpec) -> Self {
        self.params.insert(key.into(), spec);
        self
    }

    /// Fresh, independently owned copy of every default value, in schema order.
    pub fn default_params(&self) -> IndexMap<String, ParamValue> {
        self.params
            .iter()
            .map(|(key, spec)| (key.clone(), spec.default_value.clone()))
            .collect()
    }

    /// Case-insensitive substring match on name, description, or any tag.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}
