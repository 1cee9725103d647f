mod logging;

use anyhow::{anyhow, Context};
use bddtrace_core::{
    insert_step, issue_summary, load_feature, migrate_collection, render_description,
    FeatureDocument, IssueRequest, IssueTracker, JiraClient, JsonFileStore, TrackerConfig,
};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::ASCII_FULL, Table};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(author, version, about = "BDD traceability helpers: feature files to tracker issues")]
struct BddTraceCli {
    /// Log filter (e.g. info, debug, bddtrace_core=trace). Falls back to BDDTRACE_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a feature file and print its scenarios (no network access)
    Plan {
        /// Path to the .feature file
        feature: PathBuf,
        /// Spec document the feature derives from; enables the description preview
        #[arg(long)]
        spec: Option<String>,
        /// Business issue key (e.g. TRAV-2); enables the description preview
        #[arg(long)]
        business: Option<String>,
        /// Output format
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Create the BDD tracking issue for a feature file
    Create {
        /// Tracker project key (e.g. TRAV)
        #[arg(long)]
        project: String,
        /// Issue type name (e.g. Tarea, Historia)
        #[arg(long = "type")]
        issue_type: String,
        /// Business issue key (e.g. TRAV-2)
        #[arg(long)]
        business: String,
        /// Path to the source spec.md
        #[arg(long)]
        spec: String,
        /// Path to the .feature file
        #[arg(long)]
        feature: PathBuf,
        /// Print the summary and description instead of submitting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Wrap mapping-shaped configSchema fields into a single-step list
    MigrateSchema {
        /// JSON file holding the document collection
        #[arg(long)]
        store: PathBuf,
        /// Collection name inside the store
        #[arg(long, default_value = "services")]
        collection: String,
    },
    /// Insert a configuration step into one service's configSchema list
    InsertStep {
        /// JSON file holding the document collection
        #[arg(long)]
        store: PathBuf,
        /// Collection name inside the store
        #[arg(long, default_value = "services")]
        collection: String,
        /// Service document id
        #[arg(long)]
        service: String,
        /// Position of the new step; past the end appends
        #[arg(long)]
        index: usize,
        /// Step as inline JSON, or @path to a JSON file
        #[arg(long)]
        step: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        };
        write!(f, "{value}")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = BddTraceCli::parse();
    let default_level = match cli.command {
        Command::Plan { .. } => "warn",
        _ => "info",
    };
    logging::init_logging(cli.log_level.as_deref(), default_level);

    match cli.command {
        Command::Plan {
            feature,
            spec,
            business,
            format,
        } => {
            let document = load_feature(&feature)?;
            let description = match (spec.as_deref(), business.as_deref()) {
                (Some(spec), Some(business)) => Some(render_description(
                    &document,
                    &display_path(&feature),
                    spec,
                    business,
                )),
                (None, None) => None,
                _ => anyhow::bail!("--spec and --business must be given together"),
            };
            output_plan(&document, description, format)?;
        }
        Command::Create {
            project,
            issue_type,
            business,
            spec,
            feature,
            dry_run,
        } => {
            // credentials are checked before the feature file is touched
            let tracker = if dry_run {
                None
            } else {
                Some(JiraClient::new(TrackerConfig::from_env()?)?)
            };

            let document = load_feature(&feature)?;
            let request = IssueRequest {
                project_key: project,
                issue_type,
                summary: issue_summary(&document.name),
                description: render_description(
                    &document,
                    &display_path(&feature),
                    &spec,
                    &business,
                ),
            };
            tracing::info!(
                feature = %display_path(&feature),
                scenarios = document.scenarios.len(),
                dry_run,
                "rendered issue description"
            );

            match tracker {
                Some(tracker) => {
                    let issue = tracker.create_issue(&request)?;
                    println!("Issue creado: {}", issue.key);
                }
                None => {
                    println!("{}\n", request.summary);
                    println!("{}", request.description);
                }
            }
        }
        Command::MigrateSchema { store, collection } => {
            let mut store = JsonFileStore::open(&store, &collection)?;
            let report = migrate_collection(&mut store)?;
            println!(
                "Migration finished. {} of {} documents updated",
                report.migrated.len(),
                report.scanned
            );
        }
        Command::InsertStep {
            store,
            collection,
            service,
            index,
            step,
        } => {
            let step = parse_step_arg(&step)?;
            let mut store = JsonFileStore::open(&store, &collection)?;
            let steps = insert_step(&mut store, &service, index, step)?;
            println!("Service {service} updated");
            println!("{}", serde_json::to_string_pretty(&steps)?);
        }
    }

    Ok(())
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    summary: String,
    feature: &'a FeatureDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

fn output_plan(
    document: &FeatureDocument,
    description: Option<String>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", document.summary());
            println!("{}", render_scenario_table(document));
            if let Some(description) = description {
                println!("\n{}", issue_summary(&document.name));
                println!("\n{description}");
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let payload = PlanOutput {
                summary: issue_summary(&document.name),
                feature: document,
                description,
            };
            if matches!(format, OutputFormat::Json) {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print!("{}", serde_yaml::to_string(&payload)?);
            }
        }
    }
    Ok(())
}

fn render_scenario_table(document: &FeatureDocument) -> String {
    let mut display = Table::new();
    display.load_preset(ASCII_FULL);
    display.set_header(vec!["#", "Kind", "Name", "Tags"]);

    for (idx, scenario) in document.scenarios.iter().enumerate() {
        display.add_row(vec![
            (idx + 1).to_string(),
            scenario.kind.label().to_string(),
            scenario.name.clone(),
            scenario.tags.join(" "),
        ]);
    }

    display.to_string()
}

fn parse_step_arg(raw: &str) -> anyhow::Result<Value> {
    let (source, origin) = match raw.strip_prefix('@') {
        Some(path) => (
            fs::read_to_string(path).with_context(|| format!("failed to read step file {path}"))?,
            path.to_string(),
        ),
        None => (raw.to_string(), "--step".to_string()),
    };
    let step: Value = serde_json::from_str(&source)
        .map_err(|err| anyhow!("invalid step JSON in {origin}: {err}"))?;
    if !step.is_object() {
        anyhow::bail!("step must be a JSON object, got {step}");
    }
    Ok(step)
}
