use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tabdeck_core::{
    links::{IconSource, LinkPatch},
    storage::{Database, LocalStore, Storage},
    AppConfig,
};

mod commands;

#[derive(Parser)]
#[command(name = "tabdeck")]
#[command(author, version, about = "A terminal new-tab page with a paged quick-link grid")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run,
    /// Add a quick link
    Add {
        /// Link URL; https:// is assumed when no scheme is given
        url: String,
        /// Display name (defaults to the host)
        #[arg(short = 'n', long)]
        name: Option<String>,
        /// Tag for filtering, repeatable
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
    },
    /// Change a quick link
    Edit {
        /// Link id or name
        id_or_name: String,
        /// New display name
        #[arg(short = 'n', long)]
        name: Option<String>,
        /// New URL
        #[arg(short = 'u', long)]
        url: Option<String>,
        /// Replace the tags, repeatable
        #[arg(short = 't', long = "tag")]
        tags: Option<Vec<String>>,
        /// Tile icon: auto, none or an image URL
        #[arg(short = 'i', long, value_parser = commands::edit::parse_icon)]
        icon: Option<IconSource>,
    },
    /// Remove a quick link
    Remove {
        /// Link id or name
        id_or_name: String,
    },
    /// List all quick links
    List,
    /// Add links from clipboard-style text on stdin
    Import,
    /// Favicon maintenance
    Favicons {
        #[command(subcommand)]
        action: FaviconAction,
    },
    /// Show or change page settings
    Settings {
        /// Grid rows
        #[arg(long)]
        rows: Option<u16>,
        /// Grid columns per page
        #[arg(long)]
        columns: Option<u16>,
        /// Icon size
        #[arg(long)]
        icon_size: Option<u16>,
        /// Use a 24-hour clock
        #[arg(long)]
        clock_24h: Option<bool>,
    },
}

#[derive(Subcommand)]
enum FaviconAction {
    /// Re-probe every link and store the best icon
    Refresh,
    /// Print the candidate icons for a link
    Show {
        /// Link id or name
        id_or_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    let tui = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, tui)?;

    // Initialize storage
    let db = Database::new(&config).await?;
    let store: Arc<dyn Storage> = Arc::new(LocalStore::new(db));

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config, store).await,
        Some(Commands::Add { url, name, tags }) => {
            commands::add::run(store.as_ref(), &url, name, tags).await
        }
        Some(Commands::Edit {
            id_or_name,
            name,
            url,
            tags,
            icon,
        }) => {
            let patch = LinkPatch {
                name,
                url,
                icon,
                tags,
            };
            commands::edit::run(store.as_ref(), &id_or_name, patch).await
        }
        Some(Commands::Remove { id_or_name }) => {
            commands::remove::run(store.as_ref(), &id_or_name).await
        }
        Some(Commands::List) => commands::list::run(store.as_ref()).await,
        Some(Commands::Import) => commands::import::run(store.as_ref()).await,
        Some(Commands::Favicons { action }) => match action {
            FaviconAction::Refresh => commands::favicons::refresh(&config, store).await,
            FaviconAction::Show { id_or_name } => {
                commands::favicons::show(store.as_ref(), &id_or_name).await
            }
        },
        Some(Commands::Settings {
            rows,
            columns,
            icon_size,
            clock_24h,
        }) => {
            let patch = tabdeck_core::links::SettingsPatch {
                grid_rows: rows,
                grid_columns: columns,
                icon_size,
                clock_24h,
                ..Default::default()
            };
            commands::settings::run(store.as_ref(), patch).await
        }
    }
}

/// Log to stderr, or to a file while the TUI owns the terminal
fn init_logging(config: &AppConfig, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if tui {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}
