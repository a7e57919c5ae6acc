use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Case-insensitive match against name, description and tags
    #[arg(long, short, value_name = "TEXT", default_value = "")]
    pub search: String,

    /// Restrict to one category (e.g. data-cleaning, nlp, vision) or `all`
    #[arg(long, short, value_name = "CATEGORY", default_value = "all")]
    pub category: String,

    /// Only show favorited operators
    #[arg(long)]
    pub favorites: bool,

    /// Ordering: catalog, popular or name
    #[arg(long, value_name = "ORDER", default_value = "catalog")]
    pub sort: String,

    /// Group the listing by category
    #[arg(long)]
    pub grouped: bool,
}

#[derive(Args, Debug)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: FavoritesCommand,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    /// Mark an operator as favorite
    Add {
        #[arg(value_name = "OPERATOR_ID")]
        id: String,
    },
    /// Unmark an operator
    Remove {
        #[arg(value_name = "OPERATOR_ID")]
        id: String,
    },
    /// List favorite operator ids
    List,
}

#[derive(Args, Debug)]
pub struct PipelineArgs {
    #[command(subcommand)]
    pub command: PipelineCommand,
}

#[derive(Subcommand, Debug)]
pub enum PipelineCommand {
    /// Validate a cleansing plan and show each operator's parameter form
    Check {
        #[arg(value_name = "PLAN")]
        plan: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct CleansingArgs {
    #[command(subcommand)]
    pub command: CleansingCommand,
}

#[derive(Subcommand, Debug)]
pub enum CleansingCommand {
    /// Create a cleansing task from a YAML plan
    Create {
        #[arg(value_name = "PLAN")]
        plan: PathBuf,

        /// Print the request body instead of submitting it
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args, Debug)]
pub struct DatasetsArgs {
    #[command(subcommand)]
    pub command: DatasetsCommand,
}

#[derive(Subcommand, Debug)]
pub enum DatasetsCommand {
    /// List datasets page by page
    List {
        #[arg(long, value_name = "TEXT")]
        keyword: Option<String>,

        /// Dataset type filter (TEXT, IMAGE, AUDIO, VIDEO, MULTIMODAL)
        #[arg(long = "type", value_name = "TYPE")]
        dataset_type: Option<String>,

        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page: u32,

        /// Page size (default: api.page_size)
        #[arg(long, value_name = "N")]
        page_size: Option<u32>,
    },
    /// Create a dataset, optionally uploading local files into it
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long = "type", value_name = "TYPE", default_value = "TEXT")]
        dataset_type: String,

        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Import from a finished collection task instead of local files
        #[arg(long, value_name = "TASK_ID", conflicts_with = "files")]
        collection_task: Option<String>,

        /// Local files uploaded once the dataset exists
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Delete a dataset; deleting a missing dataset succeeds
    Delete {
        #[arg(value_name = "DATASET_ID")]
        id: String,
    },
    /// Upload files into an existing dataset (Ctrl-C cancels the rest)
    Upload {
        #[arg(value_name = "DATASET_ID")]
        id: String,

        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// List files of a dataset
    Files {
        #[arg(value_name = "DATASET_ID")]
        id: String,
    },
}
