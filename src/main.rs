//! CLI entry point for postwrap

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postwrap::commands::wrap::WrapOptions;

#[derive(Parser)]
#[command(name = "postwrap")]
#[command(version)]
#[command(about = "Wrap CMS blog posts into HTML pages and rebuild the post index", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Defaults to `wrap`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap front-matter posts and rebuild the index
    #[command(alias = "w")]
    Wrap {
        /// Keep running and re-wrap when posts change
        #[arg(short, long)]
        watch: bool,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Rebuild the index without touching post files
    Index,

    /// List indexed content
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Create a new front-matter post
    New {
        /// Title of the new post
        title: String,

        /// Tags for the post (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Create the config file, posts directory and template
    Init {
        /// Directory to initialize (defaults to the base directory)
        folder: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postwrap=debug,info"
    } else {
        "postwrap=info"
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
        None => std::env::current_dir().context("reading current directory")?,
    };

    let command = cli.command.unwrap_or(Commands::Wrap {
        watch: false,
        dry_run: false,
    });

    match command {
        Commands::Wrap { watch, dry_run } => {
            let site = postwrap::Site::new(&base_dir)?;
            let options = WrapOptions { dry_run };
            let report = site.wrap(options)?;
            println!(
                "Done: {} wrapped, {} converted, {} skipped, {} indexed",
                report.wrapped, report.repaired, report.skipped, report.indexed
            );

            if watch {
                postwrap::commands::wrap::watch(&site, options)?;
            }
        }

        Commands::Index => {
            let site = postwrap::Site::new(&base_dir)?;
            let index = site.rebuild_index()?;
            println!("Indexed {} posts", index.items.len());
        }

        Commands::List { r#type } => {
            let site = postwrap::Site::new(&base_dir)?;
            postwrap::commands::list::run(&site, &r#type)?;
        }

        Commands::New { title, tags } => {
            let site = postwrap::Site::new(&base_dir)?;
            let path = postwrap::commands::new::create_post(&site, &title, &tags)?;
            println!("Created: {:?}", path);
        }

        Commands::Init { folder } => {
            let target_dir = match folder {
                Some(folder) if folder.is_absolute() => folder,
                Some(folder) => base_dir.join(folder),
                None => base_dir,
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            postwrap::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Version => {
            println!("postwrap version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
