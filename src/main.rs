//! CLI entry point for storyfront

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyfront::commands::saved::SavedAction;
use storyfront::content::SortOrder;

#[derive(Parser)]
#[command(name = "storyfront")]
#[command(version)]
#[command(about = "A server-rendered blog front-end for headless CMS content", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Content API access token (overrides cms.token)
    #[arg(long, global = true, env = "STORYBLOK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Start the web server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Keep saved posts in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// List posts, saved ones marked with `*`
    List {
        /// newest, oldest or title
        #[arg(short, long, default_value = "newest")]
        sort: String,

        /// Maximum number of posts
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Manage saved posts
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
enum SavedCommands {
    /// List saved post ids
    List {
        /// Look up post titles from the content backend
        #[arg(short, long)]
        resolve: bool,
    },
    /// Save a post
    Add { id: String },
    /// Unsave a post
    Remove { id: String },
    /// Flip a post's saved state
    Toggle { id: String },
}

impl From<SavedCommands> for SavedAction {
    fn from(command: SavedCommands) -> Self {
        match command {
            SavedCommands::List { resolve } => SavedAction::List { resolve },
            SavedCommands::Add { id } => SavedAction::Add(id),
            SavedCommands::Remove { id } => SavedAction::Remove(id),
            SavedCommands::Toggle { id } => SavedAction::Toggle(id),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "storyfront=debug,info"
    } else {
        "storyfront=info"
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

    let load_site = || -> Result<storyfront::Storyfront> {
        let mut site = storyfront::Storyfront::new(&base_dir)?;
        site.set_token(cli.token.clone());
        Ok(site)
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            storyfront::commands::init::init_site(&target_dir)?;
            println!("Initialized new site in {:?}", target_dir);
        }

        Commands::Serve {
            port,
            ip,
            open,
            ephemeral,
        } => {
            let site = load_site()?;
            let ip = ip.unwrap_or_else(|| site.config.server.ip.clone());
            let port = port.unwrap_or(site.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            storyfront::server::start(&site, &ip, port, open, ephemeral).await?;
        }

        Commands::List { sort, limit } => {
            let site = load_site()?;
            storyfront::commands::list::run(&site, SortOrder::parse(&sort), limit).await?;
        }

        Commands::Saved { command } => {
            let site = load_site()?;
            storyfront::commands::saved::run(&site, command.into()).await?;
        }

        Commands::Version => {
            println!("storyfront version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
