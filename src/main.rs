use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use snippetor::config::{self, Config};
use snippetor::migrate::BackgroundSync;
use snippetor::model::SnippetKind;
use snippetor::output::Format;

#[derive(Parser)]
#[command(
    name = "snippetor",
    version,
    about = "Manage task and folder CSS snippets for an Obsidian vault"
)]
struct Cli {
    /// Vault root (defaults to $SNIPPETOR_VAULT, then the current directory)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    /// More log output on stderr (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the settings file for this vault
    Init,
    /// Create a snippet seeded with defaults
    New {
        /// Snippet type
        #[arg(long = "type", value_enum, default_value = "simple-task")]
        kind: SnippetKind,
        /// Snippet name (random when omitted)
        #[arg(long)]
        name: Option<String>,
    },
    /// List all snippets
    List {
        /// Only snippets of this type
        #[arg(long = "type", value_enum)]
        kind: Option<SnippetKind>,
    },
    /// Show one snippet
    Show {
        /// Snippet id or unique name
        id: String,
        /// Print the generated stylesheet instead
        #[arg(long)]
        css: bool,
    },
    /// Normalize a single snippet document and print it; nothing is saved
    Migrate {
        /// JSON file to read (stdin when omitted or `-`)
        file: Option<PathBuf>,
        /// Version to stamp instead of the built-in current version
        #[arg(long)]
        current_version: Option<String>,
        /// Copy legacy text backgrounds onto the list item
        #[arg(long)]
        sync_text_background: bool,
    },
    /// Upgrade every stored snippet to the current schema
    Upgrade {
        /// Report what would change without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Duplicate a snippet under a new name
    Copy {
        /// Snippet id or unique name
        id: String,
    },
    /// Rename a snippet and regenerate its stylesheet
    Rename {
        /// Snippet id or unique name
        id: String,
        /// New name
        name: String,
    },
    /// Remove a snippet and its stylesheet
    Remove {
        /// Snippet id or unique name
        id: String,
    },
    /// Write stylesheets into the vault snippets directory
    Generate {
        /// Snippet ids or unique names
        #[arg(required_unless_present = "all")]
        ids: Vec<String>,
        /// Generate every snippet
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },
    /// Check a task snippet for duplicate, empty or reserved markers
    Check {
        /// Snippet id or unique name
        id: String,
    },
}

fn run(cli: Cli, format: Format) -> snippetor::error::Result<()> {
    // Commands that never touch the vault
    if let Commands::Migrate {
        file,
        current_version,
        sync_text_background,
    } = &cli.command
    {
        let sync = if *sync_text_background {
            BackgroundSync::Corrected
        } else {
            config::resolve_background_sync()
        };
        return snippetor::commands::migrate::run(
            file.as_deref(),
            current_version.as_deref(),
            sync,
            format,
        );
    }

    let config = Config::resolve(cli.vault)?;
    tracing::debug!(vault = %config.vault().display(), "resolved vault");

    match cli.command {
        Commands::Migrate { .. } => unreachable!(),
        Commands::Init => snippetor::commands::init::run(&config),
        Commands::New { kind, name } => {
            snippetor::commands::new::run(&config, kind, name.as_deref(), format)
        }
        Commands::List { kind } => snippetor::commands::list::run(&config, kind, format),
        Commands::Show { id, css } => snippetor::commands::show::run(&config, &id, css, format),
        Commands::Upgrade { dry_run } => {
            snippetor::commands::upgrade::run(&config, dry_run, format)
        }
        Commands::Copy { id } => snippetor::commands::copy::run(&config, &id, format),
        Commands::Rename { id, name } => {
            snippetor::commands::rename::run(&config, &id, &name, format)
        }
        Commands::Remove { id } => snippetor::commands::remove::run(&config, &id, format),
        Commands::Generate { ids, all } => {
            snippetor::commands::generate::run(&config, &ids, all, format)
        }
        Commands::Check { id } => snippetor::commands::check::run(&config, &id, format),
    }
}

fn main() {
    let cli = Cli::parse();
    snippetor::telemetry::init(cli.verbose);
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
