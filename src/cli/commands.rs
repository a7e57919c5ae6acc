use crate::{
    api::{
        create_dataset_with_uploads, upload_all, EntityApi, HttpApiClient, ListQuery, Resource,
        UploadCanceller, UploadReport,
    },
    cli::args::{
        CatalogArgs, CleansingCommand, DatasetsCommand, FavoritesCommand, PipelineCommand,
    },
    cli::plan::{CleansingPlan, PlanProblem},
    core::{
        catalog::{
            builtin_catalog, filter, group_by_category, Catalog, CategoryFilter, Favorites,
            FilterState, OperatorTemplate, SortOrder,
        },
        config::{ConfigLoader, ConfigValidator, ConsoleConfig},
        pipeline::{render, FieldView},
        wizard::{
            CleansingTaskFlow, DatasetCreateFlow, DatasetType, ImportConfig, ImportSource,
            Wizard, WizardFlow,
        },
    },
    Result,
};
use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Resolved configuration shared by every command of one invocation.
pub struct Session {
    pub config: ConsoleConfig,
    pub json: bool,
}

impl Session {
    pub fn load(config_file: &Path, json: bool) -> Result<Self> {
        let config = ConfigLoader::load_with_overrides(config_file)?;
        ConfigValidator::validate(&config)?;
        Ok(Session { config, json })
    }

    fn catalog(&self) -> Result<Catalog> {
        match &self.config.catalog.path {
            Some(path) => Ok(Catalog::from_yaml_file(path)?),
            None => Ok(builtin_catalog()),
        }
    }

    fn favorites_path(&self) -> Result<PathBuf> {
        self.config
            .catalog
            .favorites_file
            .clone()
            .or_else(Favorites::default_path)
            .ok_or_else(|| anyhow!("no favorites file configured and no user config directory"))
    }

    fn client(&self) -> Result<HttpApiClient> {
        Ok(HttpApiClient::new(&self.config.api)?)
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

pub async fn catalog(session: &Session, args: CatalogArgs) -> Result<()> {
    let catalog = session.catalog()?;
    let favorites = Favorites::load(&session.favorites_path()?)?;
    let state = FilterState {
        search_term: args.search,
        category: args
            .category
            .parse::<CategoryFilter>()
            .map_err(|e| anyhow!(e))?,
        favorites_only: args.favorites,
        sort: args.sort.parse::<SortOrder>().map_err(|e| anyhow!(e))?,
    };

    let visible = filter(&catalog, &state, &favorites);
    tracing::debug!("{} of {} operators visible", visible.len(), catalog.len());

    if args.grouped {
        let groups = group_by_category(&visible);
        if session.json {
            return session.emit(&groups);
        }
        for (category, templates) in &groups {
            println!("{} ({})", category, templates.len());
            for template in templates {
                println!("  {}", template_line(template, &favorites));
            }
        }
    } else {
        if session.json {
            return session.emit(&visible);
        }
        for template in &visible {
            println!("{}", template_line(template, &favorites));
        }
    }

    if visible.is_empty() {
        println!("No operators match the current filters.");
    }
    Ok(())
}

fn template_line(template: &OperatorTemplate, favorites: &Favorites) -> String {
    let mut markers = String::new();
    if favorites.contains(&template.id) {
        markers.push('*');
    }
    if template.is_popular {
        markers.push('+');
    }
    format!(
        "{:<24} {:<28} {:<14} {}",
        template.id, template.name, template.category, markers
    )
}

pub async fn favorites(session: &Session, command: FavoritesCommand) -> Result<()> {
    let path = session.favorites_path()?;
    let mut favorites = Favorites::load(&path)?;

    match command {
        FavoritesCommand::Add { id } => {
            if session.catalog()?.get(&id).is_none() {
                bail!("unknown operator '{}'", id);
            }
            if favorites.add(id.clone()) {
                favorites.save(&path)?;
                println!("Added '{}' to favorites.", id);
            } else {
                println!("'{}' is already a favorite.", id);
            }
        }
        FavoritesCommand::Remove { id } => {
            if favorites.remove(&id) {
                favorites.save(&path)?;
                println!("Removed '{}' from favorites.", id);
            } else {
                println!("'{}' was not a favorite.", id);
            }
        }
        FavoritesCommand::List => {
            if session.json {
                return session.emit(&favorites);
            }
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for id in favorites.iter() {
                println!("{}", id);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OperatorReport {
    instance_id: String,
    operator: String,
    position: usize,
    fields: Vec<FieldView>,
}

#[derive(Serialize)]
struct PlanReport {
    problems: Vec<PlanProblem>,
    issues: Vec<String>,
    operators: Vec<OperatorReport>,
}

fn load_plan(
    session: &Session,
    path: &Path,
) -> Result<(Wizard<CleansingTaskFlow>, Vec<PlanProblem>)> {
    let plan = CleansingPlan::load(path)?;
    Ok(plan.into_wizard(session.catalog()?))
}

fn issue_lines(wizard: &Wizard<CleansingTaskFlow>) -> Vec<String> {
    wizard
        .all_issues()
        .into_iter()
        .map(|(step, issue)| format!("{}.{}: {}", step, issue.field, issue.message))
        .collect()
}

pub async fn pipeline(session: &Session, command: PipelineCommand) -> Result<()> {
    match command {
        PipelineCommand::Check { plan } => {
            let (wizard, problems) = load_plan(session, &plan)?;
            let flow = wizard.flow();
            let operators = flow
                .pipeline
                .iter()
                .enumerate()
                .filter_map(|(position, instance)| {
                    let template = flow.catalog().get(instance.template_id())?;
                    Some(OperatorReport {
                        instance_id: instance.instance_id().to_string(),
                        operator: template.id.clone(),
                        position,
                        fields: render(instance, template),
                    })
                })
                .collect();
            let report = PlanReport {
                problems,
                issues: issue_lines(&wizard),
                operators,
            };

            if session.json {
                session.emit(&report)?;
            } else {
                print_plan_report(&report);
            }

            if !report.problems.is_empty() || !report.issues.is_empty() {
                bail!(
                    "plan {} has {} problem(s) and {} validation issue(s)",
                    plan.display(),
                    report.problems.len(),
                    report.issues.len()
                );
            }
            Ok(())
        }
    }
}

fn print_plan_report(report: &PlanReport) {
    for operator in &report.operators {
        println!(
            "{}. {} [{}]",
            operator.position + 1,
            operator.operator,
            operator.instance_id
        );
        for field in &operator.fields {
            let flag = if field.missing { "  (needs value)" } else { "" };
            println!("     {:<22} {:<9} {}{}", field.key, field.kind, field.value, flag);
        }
    }
    for problem in &report.problems {
        println!("problem: {}", problem);
    }
    for issue in &report.issues {
        println!("invalid: {}", issue);
    }
    if report.problems.is_empty() && report.issues.is_empty() {
        println!("Plan is ready to submit.");
    }
}

pub async fn cleansing(session: &Session, command: CleansingCommand) -> Result<()> {
    match command {
        CleansingCommand::Create { plan, dry_run } => {
            let (mut wizard, problems) = load_plan(session, &plan)?;
            if !problems.is_empty() {
                for problem in &problems {
                    eprintln!("problem: {}", problem);
                }
                bail!("plan {} could not be applied", plan.display());
            }
            if !wizard.can_submit() {
                for issue in issue_lines(&wizard) {
                    eprintln!("invalid: {}", issue);
                }
                bail!("plan {} is not ready to submit", plan.display());
            }

            if dry_run {
                let request = wizard.flow().assemble(Utc::now());
                return session.emit(&request);
            }

            let client = session.client()?;
            let created = wizard.submit(&client).await?;
            if session.json {
                session.emit(&created)?;
            } else {
                println!(
                    "Created cleansing task {}",
                    crate::api::entity_id(&created).unwrap_or_else(|| "(no id returned)".into())
                );
            }
            Ok(())
        }
    }
}

pub async fn datasets(session: &Session, command: DatasetsCommand) -> Result<()> {
    let client = session.client()?;
    match command {
        DatasetsCommand::List {
            keyword,
            dataset_type,
            tags,
            page,
            page_size,
        } => {
            let dataset_type = dataset_type
                .map(|t| t.parse::<DatasetType>().map_err(|e| anyhow!(e)))
                .transpose()?;
            let query = ListQuery {
                keyword,
                entity_type: dataset_type.map(|t| t.to_string()),
                status: None,
                tags,
                page,
                page_size: page_size.unwrap_or(session.config.api.page_size),
            };
            let result = client.list(Resource::Datasets, &query).await?;
            if session.json {
                return session.emit(&result);
            }
            for dataset in &result.results {
                println!(
                    "{:<12} {:<32} {}",
                    crate::api::entity_id(dataset).unwrap_or_default(),
                    dataset.get("name").and_then(Value::as_str).unwrap_or(""),
                    dataset
                        .get("datasetType")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                );
            }
            println!(
                "page {} ({} of {} datasets)",
                query.page,
                result.results.len(),
                result.total_elements
            );
            Ok(())
        }
        DatasetsCommand::Create {
            name,
            description,
            dataset_type,
            tags,
            collection_task,
            files,
        } => {
            let mut flow = DatasetCreateFlow::new();
            flow.basic.name = name;
            flow.basic.description = description;
            flow.basic.dataset_type = dataset_type.parse().map_err(|e: String| anyhow!(e))?;
            flow.basic.tags = tags;
            let source = match (collection_task, files.is_empty()) {
                (Some(task_id), _) => ImportSource::Collection { task_id },
                (None, false) => ImportSource::LocalUpload,
                (None, true) => ImportSource::Empty,
            };
            flow.import.replace(ImportConfig { source, files });

            let mut wizard = Wizard::new(flow);
            while wizard.next() {}
            if !wizard.can_submit() {
                let issues: Vec<String> = wizard
                    .all_issues()
                    .into_iter()
                    .map(|(step, issue)| format!("{}.{}: {}", step, issue.field, issue.message))
                    .collect();
                bail!("dataset is not ready to create: {}", issues.join("; "));
            }

            let canceller = UploadCanceller::new();
            let interrupt = cancel_on_ctrl_c(&canceller);
            let outcome = create_dataset_with_uploads(&mut wizard, &client, &canceller).await;
            interrupt.abort();
            let outcome = outcome?;

            if session.json {
                session.emit(&json!({
                    "dataset": outcome.dataset,
                    "uploaded": outcome.uploads.uploaded,
                    "retry": outcome.uploads.retryable_paths(),
                }))?;
            } else {
                println!("Created dataset {}", outcome.dataset_id);
                print_upload_report(&outcome.uploads);
            }
            if !outcome.is_complete() {
                bail!(
                    "dataset {} was created but {} file(s) were not uploaded; retry with `datamate datasets upload {}`",
                    outcome.dataset_id,
                    outcome.uploads.retryable_paths().len(),
                    outcome.dataset_id
                );
            }
            Ok(())
        }
        DatasetsCommand::Delete { id } => {
            client
                .delete(Resource::Datasets, &id)
                .await
                .with_context(|| format!("failed to delete dataset {}", id))?;
            println!("Deleted dataset {}", id);
            Ok(())
        }
        DatasetsCommand::Upload { id, files } => {
            let canceller = UploadCanceller::new();
            let interrupt = cancel_on_ctrl_c(&canceller);
            let report = upload_all(&client, Resource::Datasets, &id, &files, &canceller).await;
            interrupt.abort();

            if session.json {
                session.emit(&json!({
                    "uploaded": report.uploaded,
                    "retry": report.retryable_paths(),
                    "cancelled": report.cancelled,
                }))?;
            } else {
                print_upload_report(&report);
            }
            if !report.is_complete() {
                bail!("{} file(s) were not uploaded", report.retryable_paths().len());
            }
            Ok(())
        }
        DatasetsCommand::Files { id } => {
            let files = client.list_files(Resource::Datasets, &id).await?;
            if session.json {
                return session.emit(&files);
            }
            for file in &files {
                println!(
                    "{:<12} {:<40} {}",
                    file.id,
                    file.file_name,
                    file.size.map(|s| s.to_string()).unwrap_or_default()
                );
            }
            Ok(())
        }
    }
}

fn print_upload_report(report: &UploadReport) {
    for entry in &report.uploaded {
        println!("uploaded  {}", entry.file_name);
    }
    for failure in &report.failed {
        println!("failed    {}: {}", failure.path.display(), failure.error.message);
    }
    for path in &report.skipped {
        println!("skipped   {}", path.display());
    }
    if report.cancelled {
        println!("Upload cancelled.");
    }
}

fn cancel_on_ctrl_c(canceller: &UploadCanceller) -> tokio::task::JoinHandle<()> {
    let canceller = canceller.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling remaining uploads");
            canceller.cancel();
        }
    })
}
