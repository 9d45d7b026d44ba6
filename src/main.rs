//! CLI entry point for ghost-to-hugo

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ghost_to_hugo::config::FrontMatterFormat;

#[derive(Parser)]
#[command(name = "ghost-to-hugo")]
#[command(version)]
#[command(about = "Convert a Ghost blog export into Hugo content", long_about = None)]
struct Cli {
    /// Hugo site directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Ghost export into content files
    #[command(alias = "c")]
    Convert {
        /// Path to the Ghost JSON export
        export: PathBuf,

        /// Front-matter format (yaml, toml, json)
        #[arg(short, long)]
        kind: Option<FrontMatterFormat>,

        /// chrono format for string dates, or "rfc3339"
        #[arg(long)]
        dateformat: Option<String>,

        /// Timezone for dates without an offset (e.g. Europe/Berlin)
        #[arg(short, long)]
        location: Option<String>,

        /// Content directory relative to the site
        #[arg(long)]
        content_dir: Option<String>,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// List export content
    List {
        /// Path to the Ghost JSON export
        export: PathBuf,

        /// Type of content to list (post, page, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "ghost_to_hugo=debug,info"
    } else {
        "ghost_to_hugo=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Convert {
            export,
            kind,
            dateformat,
            location,
            content_dir,
            force,
        } => {
            let app = ghost_to_hugo::GhostToHugo::new(&base_dir)?;
            let mut config = app.config.clone();
            if let Some(kind) = kind {
                config.front_matter = kind;
            }
            if let Some(format) = dateformat {
                config.date_format = format;
            }
            if let Some(location) = location {
                config.timezone = location;
            }
            if let Some(dir) = content_dir {
                config.content_dir = dir;
            }
            config.overwrite |= force;
            let app = ghost_to_hugo::GhostToHugo::with_config(&base_dir, config);

            tracing::info!("Converting {:?} into {:?}", export, app.content_dir);
            let summary = app.convert(&export)?;
            println!(
                "Converted {} posts ({} skipped, {} failed, {} warnings)",
                summary.written,
                summary.skipped,
                summary.failed,
                summary.diagnostics.len()
            );
        }

        Commands::List { export, r#type } => {
            let app = ghost_to_hugo::GhostToHugo::new(&base_dir)?;
            app.list(&export, &r#type)?;
        }

        Commands::Version => {
            println!("ghost-to-hugo version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
