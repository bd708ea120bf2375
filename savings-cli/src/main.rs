use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use savings_core::embed::{JsonLineHost, ResizeNotifier};
use savings_core::{CategoryKey, ScopeMode};
use tracing::{debug, info};

use savings_cli::app::{self, CategoryEdit, Session};
use savings_cli::config::EstimatorConfig;
use savings_cli::logging::Logging;
use savings_cli::render::Report;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Interactive savings estimator for service-line pricing changes.
///
/// Loads the last saved scenario (or the one carried by `--link`), applies
/// the requested change, saves it and prints the updated figures.
#[derive(Debug, Parser)]
#[command(name = "savings", version)]
struct Cli {
    /// Config file. Defaults to `savings.toml` in the working directory,
    /// if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot store backend (`sqlite` or `memory`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Store connection string. For SQLite a file path or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// A shared estimator URL to load state from.
    #[arg(long, global = true)]
    link: Option<String>,

    /// `all` enabled categories or only the `active` one.
    #[arg(long, global = true)]
    scope: Option<String>,

    /// Category the active scope refers to.
    #[arg(long, global = true)]
    active: Option<String>,

    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,

    #[arg(long = "log-file", global = true)]
    log_file: Option<PathBuf>,

    /// Also post resize messages for an embedding host on stdout.
    #[arg(long, global = true)]
    embedded: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print per-category figures, totals and the partner fee.
    Show {
        /// Print the view as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Replace one category's inputs.
    Set {
        category: String,
        #[command(flatten)]
        edit: CategoryEdit,
    },
    /// Count a category toward totals.
    Enable { category: String },
    /// Exclude a category from totals.
    Disable { category: String },
    /// Reset every category to zero.
    Clear,
    /// Load the walkthrough scenario.
    Demo,
    /// Export savings data.
    Export {
        /// `csv` or `json`.
        #[arg(long, default_value = "csv")]
        format: String,
        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace categories from a CSV file.
    Import { file: PathBuf },
    /// Print the shareable URL for the current state.
    Share,
}

fn parse_category(name: &str) -> Result<CategoryKey> {
    CategoryKey::parse(name.trim()).ok_or_else(|| {
        let known: Vec<_> = CategoryKey::ALL.iter().map(|k| k.as_str()).collect();
        anyhow!("unknown category '{name}' (expected one of: {})", known.join(", "))
    })
}

// ─── configuration ───────────────────────────────────────────────────────────

fn resolve_config(cli: &Cli) -> Result<EstimatorConfig> {
    let mut config = EstimatorConfig::load(cli.config.as_deref()).context("failed to load config")?;

    if let Some(backend) = &cli.backend {
        config.store.backend = backend.clone();
    }
    if let Some(db) = &cli.db {
        config.store.connection_string = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if let Some(file) = &cli.log_file {
        config.log.file = Some(file.clone());
    }
    Ok(config)
}

fn apply_logging(
    logging: &Logging,
    config: &EstimatorConfig,
) -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        logging.set_level(&config.log.level)?;
    }
    if let Some(path) = &config.log.file {
        logging.log_to_file(path)?;
    }
    Ok(())
}

// ─── output ──────────────────────────────────────────────────────────────────

struct Output {
    notifier: ResizeNotifier,
}

impl Output {
    fn new(embedded: bool) -> Self {
        let notifier = if embedded {
            ResizeNotifier::attached(Box::new(JsonLineHost::new(io::stdout())))
        } else {
            ResizeNotifier::detached()
        };
        Self { notifier }
    }

    fn emit(
        &mut self,
        text: &str,
    ) {
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
        let height = u32::try_from(text.lines().count()).unwrap_or(u32::MAX);
        self.notifier.content_resized(height);
    }
}

fn report_with_link(session: &Session) -> String {
    let mut text = Report(&session.estimator.view()).to_string();
    text.push_str(&format!("\nShare: {}\n", session.location.url()));
    text
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let logging = Logging::init("warn");

    let config = resolve_config(&cli)?;
    apply_logging(&logging, &config)?;

    let mut session = app::open_session(&config, cli.link.as_deref()).await?;
    if let Some(active) = &cli.active {
        session.estimator.set_active(parse_category(active)?);
    }
    if let Some(scope) = &cli.scope {
        let mode = ScopeMode::parse(scope)
            .ok_or_else(|| anyhow!("unknown scope '{scope}' (expected all or active)"))?;
        session.estimator.set_scope(mode);
    }

    let mut out = Output::new(cli.embedded);
    let command = cli.command.unwrap_or(Command::Show { json: false });
    debug!(?command, "running command");

    match command {
        Command::Show { json } => {
            let view = session.estimator.view();
            let text = if json {
                serde_json::to_string_pretty(&view)?
            } else {
                Report(&view).to_string()
            };
            out.emit(&text);
        }
        Command::Set { category, edit } => {
            let key = parse_category(&category)?;
            let inputs = edit.apply(session.estimator.state().get(key))?;
            session.estimator.replace_category(key, inputs).await;
            out.emit(&report_with_link(&session));
        }
        Command::Enable { category } => {
            session
                .estimator
                .set_enabled(parse_category(&category)?, true)
                .await;
            out.emit(&report_with_link(&session));
        }
        Command::Disable { category } => {
            session
                .estimator
                .set_enabled(parse_category(&category)?, false)
                .await;
            out.emit(&report_with_link(&session));
        }
        Command::Clear => {
            session.estimator.clear().await;
            out.emit(&report_with_link(&session));
        }
        Command::Demo => {
            session.estimator.load_demo().await;
            out.emit(&report_with_link(&session));
        }
        Command::Export { format, output } => {
            let state = session.estimator.state();
            let scope = session.estimator.scope();
            let text = match format.as_str() {
                "csv" => savings_data::to_csv(state, scope)?,
                "json" => savings_data::to_json(state, scope)?,
                other => return Err(anyhow!("unknown export format '{other}' (expected csv or json)")),
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                    info!(path = %path.display(), "export written");
                }
                None => out.emit(&text),
            }
        }
        Command::Import { file } => {
            let records = savings_data::load_from_file(&file)
                .map_err(|e| anyhow!("failed to import '{}': {e}", file.display()))?;
            info!(rows = records.len(), "importing categories");
            session.estimator.replace_categories(records).await;
            out.emit(&report_with_link(&session));
        }
        Command::Share => {
            let url = session
                .estimator
                .share_url()
                .await
                .ok_or_else(|| anyhow!("could not build a shareable URL"))?;
            out.emit(&url);
        }
    }

    Ok(())
}
