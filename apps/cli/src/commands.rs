//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use seograph_core::{IndexableSaveFlow, MigrationsConditional};
use seograph_schema::{RenderContextBuilder, SchemaGraph};
use seograph_shared::{AppConfig, Indexable, init_config, load_config, load_config_from};
use seograph_storage::Storage;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// seograph: structured-data graphs and indexable cache maintenance.
#[derive(Parser)]
#[command(
    name = "seograph",
    version,
    about = "Render schema.org graphs for pages and keep cached indexables consistent.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.seograph/seograph.toml.
    #[arg(long, global = true, env = "SEOGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Indexables database (overrides `[storage] database_path`).
    #[arg(long, global = true, env = "SEOGRAPH_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Render the schema graph for a page context (JSON file).
    Schema {
        /// Path to the rendering context JSON.
        #[arg(long)]
        context: PathBuf,

        /// Emit compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Indexable record operations.
    Indexable {
        #[command(subcommand)]
        action: IndexableAction,
    },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Indexable subcommands.
#[derive(Subcommand)]
pub(crate) enum IndexableAction {
    /// Save an indexable (JSON file) and cascade to its children if needed.
    Save {
        /// Path to the indexable JSON.
        #[arg(long)]
        file: PathBuf,

        /// Ancestor storage ids, nearest first (comma-separated).
        #[arg(long, value_delimiter = ',')]
        ancestors: Vec<i64>,
    },
    /// Print a stored indexable.
    Show {
        #[arg(long)]
        id: i64,
    },
    /// List the direct children of a stored indexable.
    Children {
        #[arg(long)]
        id: i64,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "seograph=info",
        1 => "seograph=debug",
        _ => "seograph=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Schema { context, compact } => cmd_schema(&config, &context, compact),
        Command::Indexable { action } => {
            let db_path = match cli.db {
                Some(path) => path,
                None => config.storage.resolved_database_path()?,
            };
            match action {
                IndexableAction::Save { file, ancestors } => {
                    cmd_indexable_save(&db_path, &file, &ancestors).await
                }
                IndexableAction::Show { id } => cmd_indexable_show(&db_path, id).await,
                IndexableAction::Children { id } => cmd_indexable_children(&db_path, id).await,
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_schema(config: &AppConfig, context_path: &Path, compact: bool) -> Result<()> {
    let raw = std::fs::read_to_string(context_path)
        .map_err(|e| eyre!("cannot read context '{}': {e}", context_path.display()))?;
    let builder: RenderContextBuilder = serde_json::from_str(&raw)
        .map_err(|e| eyre!("invalid context '{}': {e}", context_path.display()))?;
    let ctx = builder.with_config(config).build()?;

    info!(
        object_type = %ctx.indexable.object_type,
        canonical = %ctx.canonical,
        "rendering schema graph"
    );

    let graph = SchemaGraph::with_defaults(config).generate(&ctx);
    let output = if compact {
        serde_json::to_string(&graph)?
    } else {
        serde_json::to_string_pretty(&graph)?
    };
    println!("{output}");

    Ok(())
}

async fn cmd_indexable_save(db_path: &Path, file: &Path, ancestors: &[i64]) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read indexable '{}': {e}", file.display()))?;
    let mut indexable: Indexable = serde_json::from_str(&raw)
        .map_err(|e| eyre!("invalid indexable '{}': {e}", file.display()))?;

    // Derive the hash from the permalink rather than trusting the file.
    let permalink = indexable.permalink.take();
    indexable.set_permalink(permalink);

    let storage = Storage::open(db_path).await?;
    let migrated = MigrationsConditional::from_storage(&storage).await;
    let flow = IndexableSaveFlow::new(&storage, &[&migrated]);

    let outcome = flow.save(indexable).await?;
    let id = outcome
        .indexable
        .id
        .ok_or_else(|| eyre!("storage returned an indexable without id"))?;

    if !ancestors.is_empty() {
        storage.set_ancestors(id, ancestors).await?;
    }

    info!(
        id,
        descendants_invalidated = outcome.descendants_invalidated,
        "indexable saved"
    );

    println!();
    println!("  Indexable saved.");
    println!("  ID:          {id}");
    println!("  Type:        {}", outcome.indexable.object_type);
    println!(
        "  Permalink:   {}",
        outcome.indexable.permalink.as_deref().unwrap_or("-")
    );
    println!(
        "  Descendants: {}",
        if outcome.descendants_invalidated {
            "invalidated"
        } else {
            "untouched"
        }
    );
    println!();

    Ok(())
}

async fn cmd_indexable_show(db_path: &Path, id: i64) -> Result<()> {
    let storage = Storage::open_readonly(db_path).await?;
    let indexable = storage
        .find_indexable(id)
        .await?
        .ok_or_else(|| eyre!("no indexable with id {id}"))?;
    println!("{}", serde_json::to_string_pretty(&indexable)?);
    Ok(())
}

async fn cmd_indexable_children(db_path: &Path, id: i64) -> Result<()> {
    let storage = Storage::open_readonly(db_path).await?;
    let children = storage.children_of(id).await?;

    if children.is_empty() {
        println!("no children for indexable {id}");
        return Ok(());
    }

    for child in children {
        println!(
            "  {:>6}  {:<10} {}",
            child.id.unwrap_or_default(),
            child.object_type,
            child.permalink.as_deref().unwrap_or("(permalink cleared)")
        );
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config)?;
    println!("{rendered}");
    Ok(())
}
