//! rest-chain CLI - send saved requests with their prerequisite chains

use clap::{Parser, Subcommand};
use log::{debug, error};
use rest_chain::chain::{PreRequestChainExecutor, PrerequisiteFailurePolicy};
use rest_chain::collection::{CollectionStore, InMemoryCollectionStore};
use rest_chain::config::{get_config, load_config_file, update_config};
use rest_chain::environment::loader::ENV_FILE_NAMES;
use rest_chain::environment::{dotenv, load_environments_named, EnvironmentSession};
use rest_chain::executor::ReqwestTransport;
use rest_chain::store::ResponseStore;
use rest_chain::variables::{VariableMap, VariableScopeResolver};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rest-chain")]
#[command(about = "Send saved HTTP requests, running their prerequisite chains first")]
#[command(version)]
struct Cli {
    /// Workspace root; environment and .env files are looked up from here
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Workspace file with the request collections
    #[arg(short, long, default_value = "rest-chain.json")]
    collections: PathBuf,

    /// JSON settings file with a "rest-chain" section
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Environment to activate
    #[arg(short, long)]
    env: Option<String>,

    /// Request override, KEY=VALUE (repeatable)
    #[arg(long = "var", value_parser = parse_override)]
    vars: Vec<(String, String)>,

    /// Fail instead of sending unresolved {{placeholders}}
    #[arg(long)]
    strict: bool,

    /// What to do when a prerequisite returns a non-2xx status (abort, continue)
    #[arg(long)]
    on_prerequisite_failure: Option<PrerequisiteFailurePolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the prerequisite chain and send a request
    Send {
        /// Request id
        id: String,
    },

    /// Print a request with its placeholders resolved, without sending it
    Resolve {
        /// Request id
        id: String,
    },

    /// List request ids
    List,

    /// List environments, marking the active one
    Envs,
}

fn parse_override(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    if let Some(settings) = &cli.settings {
        load_config_file(settings)?;
    }
    let strict = cli.strict;
    let policy = cli.on_prerequisite_failure;
    update_config(|config| {
        config.fail_on_unresolved |= strict;
        if let Some(policy) = policy {
            config.prerequisite_failure_policy = policy;
        }
    });
    let config = get_config();

    let store = load_store(&cli.workspace, &cli.collections, cli.env.as_deref())?;
    let request_ids = store.request_ids();
    let session = store.environments().clone();
    let store = Arc::new(store);

    let resolver = VariableScopeResolver::new(store.clone(), ResponseStore::new());
    let transport =
        Arc::new(ReqwestTransport::new(&config).map_err(|e| e.to_string())?);
    let executor = PreRequestChainExecutor::from_config(resolver, transport, &config);
    let overrides: VariableMap = cli.vars.into_iter().collect();

    match cli.command {
        Commands::List => {
            for id in request_ids {
                println!("{}", id);
            }
            Ok(())
        }
        Commands::Envs => {
            let active = session.get_active_environment_name();
            for name in session.list_environment_names() {
                let marker = if active.as_deref() == Some(name.as_str()) { "*" } else { " " };
                println!("{} {}", marker, name);
            }
            Ok(())
        }
        Commands::Resolve { id } => {
            let request = find_request(store.as_ref(), &id)?;
            let resolved = executor
                .prepare(&request, Some(&overrides))
                .map_err(|e| e.to_string())?;
            let json = serde_json::to_string_pretty(&resolved).map_err(|e| e.to_string())?;
            println!("{}", json);
            Ok(())
        }
        Commands::Send { id } => {
            let request = find_request(store.as_ref(), &id)?;
            let outcome = executor
                .send(&request, Some(&overrides))
                .await
                .map_err(|e| e.to_string())?;

            for report in &outcome.prerequisites {
                eprintln!(
                    "prerequisite {} -> {} ({:?})",
                    report.id, report.status, report.decision
                );
            }

            let response = &outcome.response;
            println!("HTTP {} {}", response.status, response.status_text);
            let mut headers: Vec<_> = response.headers.iter().collect();
            headers.sort();
            for (name, value) in headers {
                println!("{}: {}", name, value);
            }
            println!();
            println!("{}", response.body);
            Ok(())
        }
    }
}

fn load_store(
    workspace: &Path,
    collections: &Path,
    active_env: Option<&str>,
) -> Result<InMemoryCollectionStore, String> {
    let config = get_config();
    let collections_path = if collections.is_absolute() {
        collections.to_path_buf()
    } else {
        workspace.join(collections)
    };

    let mut env_file_names = vec![config.environment_file.as_str()];
    env_file_names.extend(ENV_FILE_NAMES);
    let environments =
        load_environments_named(workspace, &env_file_names).map_err(|e| e.to_string())?;
    let session = EnvironmentSession::new(environments);
    if let Some(name) = active_env {
        session
            .set_active_environment(name)
            .map_err(|e| e.to_string())?;
    }

    let defaults =
        dotenv::load_dotenv_file(&workspace.join(&config.dotenv_file)).map_err(|e| e.to_string())?;
    debug!("loaded {} .env defaults", defaults.len());

    Ok(InMemoryCollectionStore::load_workspace_file(&collections_path)?
        .with_environments(session)
        .with_defaults(defaults))
}

fn find_request(
    store: &InMemoryCollectionStore,
    id: &str,
) -> Result<rest_chain::models::RequestDefinition, String> {
    store
        .find_prerequisite(id)
        .ok_or_else(|| format!("no request with id '{}'", id))
}
