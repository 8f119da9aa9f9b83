//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands::{self, parse_kind};
use folio::config::Mode;
use folio::{server, Folio};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "Samuel Sikati")]
#[command(version)]
#[command(about = "Content pipeline for a portfolio site: projects and blog posts in Markdown/MDX", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Run in production mode (hide drafts)
    #[arg(short, long, global = true)]
    production: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects, posts, tags or technologies
    #[command(alias = "ls")]
    List {
        /// What to list (projects, posts, tags, technologies)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Show one project or post
    Show {
        /// Content kind (projects, posts)
        kind: String,

        /// Slug of the record
        slug: String,

        /// Also print the rendered HTML
        #[arg(long)]
        html: bool,
    },

    /// Search projects or posts
    Search {
        /// Content kind (projects, posts)
        kind: String,

        /// Text to look for
        query: String,
    },

    /// Validate all content files
    Check,

    /// Show content statistics
    Stats {
        /// Content kind (projects, posts)
        #[arg(default_value = "projects")]
        kind: String,
    },

    /// Create a new project or post
    New {
        /// Content kind (project, post)
        kind: String,

        /// Title of the new entry
        title: String,
    },

    /// Start the preview server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short = 'P', long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,

        /// Disable file watching
        #[arg(long)]
        r#static: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let production = cli.production;

    match cli.command {
        Commands::List { r#type } => {
            let folio = load(&base_dir, production)?;
            commands::list::run(&folio, &r#type)?;
        }

        Commands::Show { kind, slug, html } => {
            let folio = load(&base_dir, production)?;
            commands::show::run(&folio, parse_kind(&kind)?, &slug, html)?;
        }

        Commands::Search { kind, query } => {
            let folio = load(&base_dir, production)?;
            commands::search::run(&folio, parse_kind(&kind)?, &query)?;
        }

        Commands::Check => {
            let folio = load(&base_dir, production)?;
            commands::check::run(&folio)?;
        }

        Commands::Stats { kind } => {
            let folio = load(&base_dir, production)?;
            commands::stats::run(&folio, parse_kind(&kind)?)?;
        }

        Commands::New { kind, title } => {
            let folio = load(&base_dir, production)?;
            let kind = parse_kind(&kind)?;
            tracing::info!("Creating new {} with title: {}", kind, title);
            commands::new::run(&folio, kind, &title)?;
        }

        Commands::Serve { port, ip, r#static } => {
            let folio = load(&base_dir, production)?;
            let ip = ip.unwrap_or_else(|| folio.config.server.ip.clone());
            let port = port.unwrap_or(folio.config.server.port);
            tracing::info!("Starting server at http://{}:{}", ip, port);
            server::start(&folio, &ip, port, !r#static).await?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Load the site, forcing production mode when asked on the command line
fn load(base_dir: &Path, production: bool) -> Result<Folio> {
    let mut folio = Folio::new(base_dir)?;
    if production {
        folio = folio.with_mode(Mode::Production);
    }
    tracing::debug!("Running in {} mode from {:?}", folio.config.mode, base_dir);
    Ok(folio)
}
