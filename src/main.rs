//! Outreach CLI entry point.
//!
//! `draft` runs the full drafting pipeline; `thread`, `messages`, `doctor`
//! and `practice` expose the record lookups behind it; `providers` shows the
//! refinement chain the current configuration builds. Results are printed as
//! pretty JSON on stdout, diagnostics go to stderr.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use outreach::config::{load_config, load_default_config, runtime_paths, Config, RuntimePaths};
use outreach::credentials::load_runtime_credentials;
use outreach::drafting::template::doctor_surname;
use outreach::drafting::{
    parse_id, DraftError, DraftFields, DraftRequest, DraftService, ErrorKind,
    RefinementOrchestrator,
};
use outreach::logging::{self, LoggingGuard};
use outreach::store::sqlite::SqliteStore;
use outreach::store::{load_thread_history, RecordStore};

/// Outreach — drafts practice outreach messages on behalf of doctors.
#[derive(Parser)]
#[command(name = "outreach", version, about)]
struct Cli {
    /// Config file (default `~/.outreach/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Record store database, overriding `[store] database`.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Draft an outreach message.
    Draft(DraftArgs),
    /// Show the thread between a practice and a doctor with its summary.
    Thread {
        /// Practice id.
        #[arg(long)]
        practice_id: String,
        /// Doctor id.
        #[arg(long)]
        doctor_id: String,
    },
    /// List a thread's messages, oldest first.
    Messages {
        /// Thread id.
        #[arg(long)]
        thread_id: String,
    },
    /// Show a doctor's display name and the surname drafts use.
    Doctor {
        /// Doctor id.
        #[arg(long)]
        doctor_id: String,
    },
    /// Show a practice's stored name.
    Practice {
        /// Practice id.
        #[arg(long)]
        practice_id: String,
    },
    /// List the refinement providers the configuration resolves to.
    Providers,
}

/// Fields of a draft request, given as flags or as a JSON file.
#[derive(Args)]
struct DraftArgs {
    /// Read the whole request from a JSON file instead of flags.
    #[arg(long, conflicts_with_all = ["doctor_id", "practice_id", "session_id"])]
    request: Option<PathBuf>,
    /// Doctor id.
    #[arg(long)]
    doctor_id: Option<String>,
    /// Practice id.
    #[arg(long)]
    practice_id: Option<String>,
    /// Booking session id.
    #[arg(long)]
    session_id: Option<String>,
    /// Session date, `YYYY-MM-DD`.
    #[arg(long)]
    date: Option<String>,
    /// Session start time.
    #[arg(long)]
    start_time: Option<String>,
    /// Session end time.
    #[arg(long)]
    end_time: Option<String>,
    /// Hourly rate in pounds.
    #[arg(long)]
    pricing: Option<String>,
    /// Practice name; the stored name is used when omitted.
    #[arg(long, default_value = "")]
    practice_name: String,
    /// Practice postcode.
    #[arg(long, default_value = "")]
    practice_postcode: String,
    /// Free-text job description.
    #[arg(long, default_value = "")]
    job_description: String,
    /// Skip generative refinement and print the rendered template.
    #[arg(long)]
    no_refine: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = err
                .downcast_ref::<DraftError>()
                .map_or(ErrorKind::Unexpected, DraftError::kind);
            eprintln!("error [{kind}]: {err:#}");
            exit_code(kind)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = runtime_paths()?;
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };
    let _logging_guard = init_logging(&config)?;

    match cli.command {
        Command::Providers => handle_providers(&config, &paths),
        command => {
            let database = cli
                .database
                .clone()
                .unwrap_or_else(|| config.database_path(&paths));
            debug!(database = %database.display(), "opening record store");
            let store = Arc::new(SqliteStore::open(&database).await?);
            dispatch(command, store, &config, &paths).await
        }
    }
}

async fn dispatch(
    command: Command,
    store: Arc<SqliteStore>,
    config: &Config,
    paths: &RuntimePaths,
) -> anyhow::Result<()> {
    match command {
        Command::Draft(args) => handle_draft(args, store, config, paths).await,
        Command::Thread {
            practice_id,
            doctor_id,
        } => {
            let practice_id = parse_id("practice_id", &practice_id)?;
            let doctor_id = parse_id("doctor_id", &doctor_id)?;
            let history = load_thread_history(store.as_ref(), practice_id, doctor_id)
                .await
                .map_err(DraftError::from)?;
            print_json(&history)
        }
        Command::Messages { thread_id } => {
            let thread_id = parse_id("thread_id", &thread_id)?;
            let messages = store
                .list_messages(thread_id)
                .await
                .map_err(DraftError::from)?;
            print_json(&messages)
        }
        Command::Doctor { doctor_id } => {
            let doctor_id = parse_id("doctor_id", &doctor_id)?;
            let display_name = store
                .find_user_display_name(doctor_id)
                .await
                .map_err(DraftError::from)?;
            print_json(&serde_json::json!({
                "doctor_id": doctor_id,
                "display_name": display_name,
                "surname": doctor_surname(&display_name),
            }))
        }
        Command::Practice { practice_id } => {
            let practice_id = parse_id("practice_id", &practice_id)?;
            let name = store
                .find_practice_name(practice_id)
                .await
                .map_err(DraftError::from)?;
            print_json(&serde_json::json!({
                "practice_id": practice_id,
                "name": name,
            }))
        }
        Command::Providers => handle_providers(config, paths),
    }
}

async fn handle_draft(
    args: DraftArgs,
    store: Arc<SqliteStore>,
    config: &Config,
    paths: &RuntimePaths,
) -> anyhow::Result<()> {
    let no_refine = args.no_refine;
    let request = match args.request.clone() {
        Some(path) => read_request(&path)?,
        None => request_from_flags(args)?,
    };

    let refiner = if no_refine {
        RefinementOrchestrator::disabled()
    } else {
        build_refiner(config, paths)?
    };

    let service = DraftService::new(store, refiner);
    let result = service.draft(&request).await?;
    print_json(&result)
}

fn handle_providers(config: &Config, paths: &RuntimePaths) -> anyhow::Result<()> {
    let refiner = build_refiner(config, paths)?;
    print_json(&serde_json::json!({
        "enabled": config.refinement.enabled,
        "configured": config.refinement.providers,
        "available": refiner.provider_ids(),
        "verify_facts": config.refinement.verify_facts,
    }))
}

fn build_refiner(config: &Config, paths: &RuntimePaths) -> anyhow::Result<RefinementOrchestrator> {
    let credentials = load_runtime_credentials(&paths.env_file)
        .with_context(|| format!("failed to load {}", paths.env_file.display()))?;
    RefinementOrchestrator::from_config(&config.refinement, &credentials)
        .context("failed to build refinement providers")
}

fn read_request(path: &Path) -> anyhow::Result<DraftRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;
    let request = serde_json::from_str(&contents)
        .map_err(|e| DraftError::Validation(format!("invalid request JSON: {e}")))?;
    Ok(request)
}

fn request_from_flags(args: DraftArgs) -> Result<DraftRequest, DraftError> {
    DraftRequest::try_from(DraftFields {
        doctor_id: args.doctor_id,
        practice_id: args.practice_id,
        session_id: args.session_id,
        date: args.date,
        start_time: args.start_time,
        end_time: args.end_time,
        pricing: args.pricing,
        practice_name: args.practice_name,
        practice_postcode: args.practice_postcode,
        job_description: args.job_description,
    })
}

fn init_logging(config: &Config) -> anyhow::Result<Option<LoggingGuard>> {
    match &config.logging.dir {
        Some(dir) => Ok(Some(logging::init_production(dir)?)),
        None => {
            logging::init_cli();
            Ok(None)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}

fn exit_code(kind: ErrorKind) -> ExitCode {
    match kind {
        ErrorKind::Validation => ExitCode::from(2),
        ErrorKind::NotFound => ExitCode::from(3),
        ErrorKind::Transient => ExitCode::from(4),
        ErrorKind::Unexpected => ExitCode::FAILURE,
    }
}
