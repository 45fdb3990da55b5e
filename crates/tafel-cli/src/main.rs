//! CLI frontend for Tafel random tables and roll templates.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use config::{CliConfig, DEFAULT_DATA_DIR};
use tafel_engine::TemplateUpdate;

#[derive(Parser)]
#[command(
    name = "tafel",
    about = "Tafel: roll on random tables and expand roll templates",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding table and template files
    #[arg(long, global = true, env = "TAFEL_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// RNG seed for reproducible rolls
    #[arg(long, global = true, env = "TAFEL_SEED")]
    seed: Option<u64>,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage random tables
    Table {
        #[command(subcommand)]
        command: TableCommand,
    },

    /// Roll on a table, resolving any template results
    Roll {
        /// Table ID
        table_id: String,

        /// Number of rolls
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },

    /// Manage and evaluate roll templates
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
}

#[derive(Subcommand)]
enum TableCommand {
    /// Import a table from a JSON file (a fresh ID is assigned if none is given)
    Import {
        /// Path to the table JSON
        file: PathBuf,
    },

    /// List stored tables
    List {
        /// Only tables with exactly this name
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a table and its entries
    Show {
        /// Table ID
        id: String,
    },

    /// Rename a table or change its entries
    Update {
        /// Table ID
        id: String,

        /// New table name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Append the entry in this JSON file (repeatable)
        #[arg(long, value_name = "ENTRY_JSON")]
        add: Vec<PathBuf>,

        /// Patch an entry, e.g. red='{"weight":3}' (repeatable)
        #[arg(long, value_name = "ID=JSON")]
        patch: Vec<String>,

        /// Remove the entry with this ID (repeatable)
        #[arg(long, value_name = "ENTRY_ID")]
        remove: Vec<String>,
    },

    /// Delete a table
    Delete {
        /// Table ID
        id: String,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Save a new template
    Create {
        /// Template name
        name: String,

        /// Template text, e.g. "A {{Color::colors::Colors}} door"
        template: String,

        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List saved templates
    List {
        /// Only templates with exactly this name
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a saved template
    Show {
        /// Template ID
        id: String,
    },

    /// Change a saved template
    Update {
        /// Template ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New template text
        #[arg(long)]
        template: Option<String>,
    },

    /// Delete a saved template
    Delete {
        /// Template ID
        id: String,
    },

    /// Evaluate a saved template
    Eval {
        /// Template ID
        id: String,

        /// Number of independent evaluations
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "tafel=debug" } else { "tafel=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = CliConfig::default()
        .with_data_dir(cli.data_dir)
        .with_seed(cli.seed)
        .with_json(cli.json);

    let result = match cli.command {
        Commands::Table { command } => match command {
            TableCommand::Import { file } => commands::table::import(&config, &file),
            TableCommand::List { name } => commands::table::list(&config, name),
            TableCommand::Show { id } => commands::table::show(&config, &id),
            TableCommand::Update {
                id,
                name,
                description,
                add,
                patch,
                remove,
            } => commands::table::update(
                &config,
                &id,
                commands::table::UpdateArgs {
                    name,
                    description,
                    add,
                    patch,
                    remove,
                },
            ),
            TableCommand::Delete { id } => commands::table::delete(&config, &id),
        },
        Commands::Roll { table_id, count } => commands::roll::run(&config, &table_id, count),
        Commands::Template { command } => match command {
            TemplateCommand::Create {
                name,
                template,
                description,
            } => commands::template::create(&config, &name, &template, &description),
            TemplateCommand::List { name } => commands::template::list(&config, name),
            TemplateCommand::Show { id } => commands::template::show(&config, &id),
            TemplateCommand::Update {
                id,
                name,
                description,
                template,
            } => commands::template::update(
                &config,
                &id,
                TemplateUpdate {
                    name,
                    description,
                    template,
                },
            ),
            TemplateCommand::Delete { id } => commands::template::delete(&config, &id),
            TemplateCommand::Eval { id, count } => {
                commands::template::eval(&config, &id, count)
            }
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
