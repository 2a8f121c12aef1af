//! Command handlers for CLI operations

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use courier_core::{RequestContext, RouterConfig, TaskRequest};
use courier_providers::{HttpTransport, LogSink};
use courier_routing::{Orchestrator, RegistryStore};

use crate::cli::InputTypeArg;

/// Builds the orchestrator from config and catalog paths.
///
/// This is the composition root: the registry store is created here and
/// handed to the orchestrator explicitly.
///
/// # Errors
///
/// Returns an error if the config or catalog cannot be read, or if the
/// catalog fails schema validation.
pub fn build_orchestrator(
    config_path: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
) -> Result<Orchestrator> {
    let config = match config_path {
        Some(path) => RouterConfig::load_from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RouterConfig::load_or_create()?,
    };

    let catalog_file = catalog_path.unwrap_or_else(|| config.catalog.path.clone());
    let bytes = fs::read(&catalog_file)
        .with_context(|| format!("failed to read catalog from {}", catalog_file.display()))?;
    let store = Arc::new(RegistryStore::from_bytes(&bytes)?);

    tracing::info!(
        services = store.current().len(),
        catalog = %catalog_file.display(),
        "registry loaded"
    );

    Ok(Orchestrator::new(
        config,
        store,
        Arc::new(HttpTransport::new()),
        Arc::new(LogSink),
    ))
}

/// Routes and dispatches a single task, printing the result as JSON.
///
/// # Errors
///
/// Returns an error if routing fails or the result cannot be serialized.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub async fn handle_run(
    orchestrator: &Orchestrator,
    input: String,
    input_type: InputTypeArg,
    service: Option<String>,
    language: Option<String>,
) -> Result<()> {
    let mut request = TaskRequest::new(input).with_input_type(input_type.into());
    if let Some(service_id) = service {
        request = request.with_requirement(service_id);
    }
    if let Some(tag) = language {
        request = request.with_context(RequestContext::new().with_language(tag));
    }

    let processed = orchestrator.process(&request).await?;
    println!("{}", serde_json::to_string_pretty(&processed)?);

    Ok(())
}

/// Dispatches a batch of tasks from a JSON file, printing settled outcomes.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub async fn handle_batch(orchestrator: &Orchestrator, file: PathBuf) -> Result<()> {
    let contents = fs::read_to_string(&file)
        .with_context(|| format!("failed to read batch file {}", file.display()))?;
    let requests: Vec<TaskRequest> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of task requests", file.display()))?;

    let outcomes = orchestrator.batch_process(requests).await;
    println!("{}", serde_json::to_string_pretty(&outcomes)?);

    Ok(())
}

/// Prints the registry listing as JSON.
///
/// # Errors
///
/// Returns an error if the listing cannot be serialized.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub fn handle_services(orchestrator: &Orchestrator) -> Result<()> {
    let listing = orchestrator.list_services();
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

/// Health-checks one provider and prints the status as JSON.
///
/// # Errors
///
/// Returns an error if the service id is unknown.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub async fn handle_check(orchestrator: &Orchestrator, service_id: String) -> Result<()> {
    let status = orchestrator.test_connection(&service_id).await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
