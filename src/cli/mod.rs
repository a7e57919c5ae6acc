pub mod args;
pub mod commands;
pub mod plan;

pub use args::{CatalogArgs, CleansingArgs, DatasetsArgs, FavoritesArgs, PipelineArgs};
pub use commands::Session;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::loader::CONFIG_FILE_NAME;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "datamate")]
#[command(version = crate::VERSION)]
#[command(about = "Operator catalog, cleansing pipelines and datasets for the DataMate platform")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: browse the catalog, check a cleansing plan, then create the task."
)]
pub struct Args {
    /// Config file (default: ./datamate.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON on stdout; console logging is suppressed
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Config file this invocation reads; it may not exist.
    pub fn config_file(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Browse the operator catalog",
        long_about = "Catalog lists operator templates filtered by search text, category and favorites, optionally grouped by category.",
        after_help = "Example:\n    datamate catalog --search dedup --category data-cleaning"
    )]
    Catalog(CatalogArgs),
    #[command(
        about = "Manage favorite operators",
        after_help = "Examples:\n    datamate favorites add pii-masking\n    datamate favorites list"
    )]
    Favorites(FavoritesArgs),
    #[command(
        about = "Inspect cleansing pipelines",
        long_about = "Pipeline check replays a YAML plan through the parameter editor and reports what still needs configuration.",
        after_help = "Example:\n    datamate pipeline check plan.yaml"
    )]
    Pipeline(PipelineArgs),
    #[command(
        about = "Create cleansing tasks",
        after_help = "Example:\n    datamate cleansing create plan.yaml --dry-run"
    )]
    Cleansing(CleansingArgs),
    #[command(
        about = "List, create, upload to and delete datasets",
        after_help = "Examples:\n    datamate datasets list --keyword news\n    datamate datasets create --name corpus a.jsonl b.jsonl"
    )]
    Datasets(DatasetsArgs),
}

pub async fn run(args: Args) -> crate::Result<()> {
    let session = Session::load(&args.config_file(), args.json)?;
    match args.command {
        Command::Catalog(catalog_args) => commands::catalog(&session, catalog_args).await,
        Command::Favorites(favorites_args) => {
            commands::favorites(&session, favorites_args.command).await
        }
        Command::Pipeline(pipeline_args) => {
            commands::pipeline(&session, pipeline_args.command).await
        }
        Command::Cleansing(cleansing_args) => {
            commands::cleansing(&session, cleansing_args.command).await
        }
        Command::Datasets(datasets_args) => {
            commands::datasets(&session, datasets_args.command).await
        }
    }
}
