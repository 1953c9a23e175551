//! mdblog CLI
//!
//! Builds a static blog from a directory of Markdown posts.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use mdblog::cmd;

/// Command-line interface for mdblog.
#[derive(Parser)]
#[command(
    name = "mdblog",
    version,
    about = "Build a static blog from Markdown posts"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "mdblog.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Convert all posts and write the index page
    Build {
        /// Directory holding the Markdown sources
        #[arg(short, long)]
        source: Option<std::path::PathBuf>,
        /// Directory receiving the HTML pages
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Path of the index page
        #[arg(short, long)]
        index: Option<std::path::PathBuf>,
        /// Path of the HTML template
        #[arg(short, long)]
        template: Option<std::path::PathBuf>,
    },
    /// Create a new post
    New {
        /// Title of the post; the file name is derived from it
        title: String,
        /// Identifier written into the `<!-- ID: n -->` marker
        #[arg(long)]
        id: Option<u64>,
        /// Create the post as a draft
        #[arg(long)]
        draft: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    mdblog::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            source,
            output,
            index,
            template,
        } => {
            let overrides = cmd::build::Overrides {
                source,
                output,
                index,
                template,
            };
            cmd::build::run(&cli.config, &overrides)?;
        }
        Commands::New { title, id, draft } => {
            cmd::new::run(&cli.config, &title, id, draft)?;
        }
    }

    Ok(())
}
