//! `quotebook` command-line front end.
//!
//! # Responsibility
//! - Wire config, logging, durable/session slots and the HTTP source.
//! - Render every domain outcome through the console presenter.
//!
//! Setup failures (config, database, logging) exit non-zero; domain failures
//! are rendered and the process exits normally.

mod console;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::ConsolePresenter;
use quotebook_core::config::DEFAULT_CONFIG_FILE;
use quotebook_core::db::open_db;
use quotebook_core::{
    default_log_level, init_logging, load_config, CategorySelection, HttpQuoteSource,
    ImportPolicy, MemorySlotStore, MergePolicy, QuotePresenter, QuoteStore, QuotebookConfig,
    ReconciliationService, SqliteSlotStore,
};
use session::{export_file, import_file, Session};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(about = "Local quote collection with server sync", long_about = None, version)]
struct Cli {
    /// Config file (defaults to ./quotebook.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a random quote
    Show {
        /// Category filter to apply and persist (`all` for every quote)
        #[arg(long)]
        category: Option<String>,
    },

    /// List quotes
    List {
        /// Only this exact category
        #[arg(long)]
        category: Option<String>,
    },

    /// List category filter options
    Categories,

    /// Add a quote
    Add {
        #[arg(long)]
        text: String,
        #[arg(long)]
        category: String,
        /// Also POST the quote to the server
        #[arg(long)]
        push: bool,
    },

    /// Import quotes from a JSON array file
    Import {
        file: PathBuf,
        /// Override the configured duplicate policy
        #[arg(long, value_enum)]
        policy: Option<ImportPolicyArg>,
    },

    /// Export all quotes as pretty-printed JSON
    Export {
        #[arg(long, default_value = "quotes.json")]
        out: PathBuf,
    },

    /// Reconcile once with the server
    Sync {
        /// Override the configured merge policy
        #[arg(long, value_enum)]
        policy: Option<MergePolicyArg>,
    },

    /// Interactive session with periodic server sync
    Session,
}

#[derive(Clone, Copy, ValueEnum)]
enum ImportPolicyArg {
    SkipDuplicates,
    AppendAll,
}

impl From<ImportPolicyArg> for ImportPolicy {
    fn from(value: ImportPolicyArg) -> Self {
        match value {
            ImportPolicyArg::SkipDuplicates => Self::SkipDuplicates,
            ImportPolicyArg::AppendAll => Self::AppendAll,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MergePolicyArg {
    Additive,
    RemoteReplacesAll,
}

impl From<MergePolicyArg> for MergePolicy {
    fn from(value: MergePolicyArg) -> Self {
        match value {
            MergePolicyArg::Additive => Self::Additive,
            MergePolicyArg::RemoteReplacesAll => Self::RemoteReplacesAll,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = load_config(&config_path)?;
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    setup_logging(&config)?;

    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create database directory `{}`", parent.display()))?;
    }
    let conn = open_db(&config.db_path)
        .with_context(|| format!("open database `{}`", config.db_path.display()))?;

    let presenter = ConsolePresenter;
    let mut store = QuoteStore::open(SqliteSlotStore::new(&conn), MemorySlotStore::new())
        .with_import_policy(config.import_policy);

    match cli.command {
        Commands::Show { category } => {
            let selection = match category {
                Some(value) => match store.set_selected_category(&value) {
                    Ok(selection) => selection,
                    Err(err) => {
                        presenter.render_error(&err.to_string());
                        CategorySelection::parse(&value)
                    }
                },
                None => store.effective_selection(),
            };
            let _ = store.show_random(&selection, &presenter);
        }
        Commands::List { category } => {
            let selection = category
                .as_deref()
                .map(CategorySelection::parse)
                .unwrap_or_default();
            let quotes = store.filter(&selection);
            if quotes.is_empty() {
                presenter.render_empty(&selection);
            }
            for quote in &quotes {
                presenter.render(quote);
            }
        }
        Commands::Categories => {
            let selected = store.selected_category();
            for option in store.category_options() {
                let marker = if option == selected.as_str() { "*" } else { " " };
                println!("{marker} {option}");
            }
        }
        Commands::Add {
            text,
            category,
            push,
        } => match store.add(&text, &category) {
            Ok(quote) => {
                presenter.notify("Quote added successfully!");
                if push || config.sync.post_new_quotes {
                    build_service(&config, config.merge_policy)?.push(&quote);
                }
            }
            Err(err) => presenter.render_error(&err.to_string()),
        },
        Commands::Import { file, policy } => {
            if let Some(policy) = policy {
                store = store.with_import_policy(policy.into());
            }
            import_file(&mut store, &file, &presenter)?;
        }
        Commands::Export { out } => export_file(&store, &out, &presenter)?,
        Commands::Sync { policy } => {
            let policy = policy.map(MergePolicy::from).unwrap_or(config.merge_policy);
            let service = build_service(&config, policy)?;
            let _ = service.sync_once(&mut store, &presenter);
        }
        Commands::Session => {
            let service = Arc::new(build_service(&config, config.merge_policy)?);
            Session::new(store, service, config.sync.post_new_quotes).run(
                Duration::from_secs(config.sync.interval_secs),
                config.sync.on_startup,
            )?;
        }
    }

    Ok(())
}

fn setup_logging(config: &QuotebookConfig) -> Result<()> {
    let Some(log_dir) = config.log_dir.as_deref() else {
        return Ok(());
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("resolve current directory")?
            .join(log_dir)
    };
    let level = config.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, &log_dir).context("initialize logging")?;
    log::info!(
        "event=cli_start module=cli status=ok core_version={}",
        quotebook_core::core_version()
    );
    Ok(())
}

fn build_service(
    config: &QuotebookConfig,
    policy: MergePolicy,
) -> Result<ReconciliationService<HttpQuoteSource>> {
    let source = HttpQuoteSource::new(&config.remote).context("build http quote source")?;
    Ok(ReconciliationService::new(source, policy))
}
