//! Opinion crawler CLI
//!
//! Collects VK posts into local sessions and reads them back.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use opinion_crawler::{
    error::Result,
    models::Config,
    pipeline::{self, CollectTarget, SessionKind},
    services::{CollectOptions, Collector},
    storage::LocalStorage,
};

/// Opinion crawler - VK post collector
#[derive(Parser, Debug)]
#[command(
    name = "opinion-crawler",
    version,
    about = "Collects VK posts and comments for opinion analysis"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Switches shared by the collect commands.
#[derive(clap::Args, Debug)]
struct CollectArgs {
    /// Fetch sex and birth date of post and comment authors
    #[arg(long)]
    with_authors: bool,

    /// Comments per post (omit for all, 0 to skip comments)
    #[arg(long)]
    comments: Option<usize>,

    /// Keep posts and comments without text
    #[arg(long)]
    keep_blank: bool,
}

impl CollectArgs {
    fn options(&self, config: &Config) -> CollectOptions {
        let defaults = CollectOptions::from(&config.collect);
        CollectOptions {
            with_authors: self.with_authors,
            comments_per_post: self.comments,
            skip_blank: defaults.skip_blank && !self.keep_blank,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect posts from one user or community wall
    Owner {
        /// Owner id (negative for communities)
        #[arg(allow_hyphen_values = true)]
        owner_id: String,

        /// Number of posts
        #[arg(short = 'n', long, default_value_t = 100)]
        count: usize,

        /// Number of newest posts to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,

        #[command(flatten)]
        collect: CollectArgs,
    },

    /// Collect posts from every popular community
    Popular {
        /// Number of posts per community
        #[arg(short = 'n', long, default_value_t = 20)]
        per_source: usize,

        #[command(flatten)]
        collect: CollectArgs,
    },

    /// Collect posts matching a search query
    Topic {
        query: String,

        /// Number of posts (at most 1000)
        #[arg(short = 'n', long, default_value_t = 200)]
        count: usize,

        /// Start of the publication window (RFC 3339)
        #[arg(long, requires = "to")]
        from: Option<DateTime<Utc>>,

        /// End of the publication window (RFC 3339)
        #[arg(long, requires = "from")]
        to: Option<DateTime<Utc>>,

        #[command(flatten)]
        collect: CollectArgs,
    },

    /// Print the documents of a saved session
    Load {
        /// Session directory
        session: PathBuf,

        #[arg(long, value_enum, default_value_t = Kind::Posts)]
        kind: Kind,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Posts,
    Texts,
}

impl From<Kind> for SessionKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Posts => SessionKind::Posts,
            Kind::Texts => SessionKind::Texts,
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Validate = cli.command {
        init_logging(cli.verbose, "info");
        pipeline::run_validate(&cli.config)?;
        log::info!("All validations passed!");
        return Ok(());
    }

    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map_or("info", |c| c.logging.level.as_str())
        .to_string();
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    }
    .with_env_overrides();
    let storage = LocalStorage::new(&config.storage);

    let (target, collect) = match cli.command {
        Command::Owner {
            owner_id,
            count,
            offset,
            collect,
        } => (
            CollectTarget::Owner {
                owner_id,
                count,
                offset,
            },
            collect,
        ),
        Command::Popular {
            per_source,
            collect,
        } => (CollectTarget::Popular { per_source }, collect),
        Command::Topic {
            query,
            count,
            from,
            to,
            collect,
        } => {
            let target = match (from, to) {
                (Some(start), Some(end)) => CollectTarget::TopicInRange {
                    query,
                    count,
                    start,
                    end,
                },
                _ => CollectTarget::Topic { query, count },
            };
            (target, collect)
        }
        Command::Load { session, kind } => {
            let count = pipeline::run_load(&storage, kind.into(), &session).await?;
            log::info!("Loaded {} document(s)", count);
            return Ok(());
        }
        Command::Validate => return Ok(()),
    };

    config.validate()?;
    let collector = Collector::from_config(&config)?;
    let options = collect.options(&config);

    match pipeline::run_collect(&collector, &storage, &target, options).await? {
        Some(dir) => println!("{}", dir.display()),
        None => log::warn!("Collection returned no result"),
    }

    Ok(())
}
