pub mod catalog;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod wizard;

pub use catalog::{Catalog, Category, Favorites, FilterState, OperatorTemplate, ParamSpec, ParamValue};
pub use config::{ConfigLoader, ConfigValidator, ConsoleConfig};
pub use error::AppError;
pub use pipeline::{InstanceId, OperatorInstance, ParameterEditor, PipelineList};
pub use types::*;
pub use wizard::{Wizard, WizardFlow, WizardPhase};
