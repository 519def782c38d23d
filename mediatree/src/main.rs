mod bootstrap;
mod commands;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use mediatree_core::{logging, LazyLoader, NavigationStore};

use bootstrap::{connect, load_config, Credentials};

#[derive(Parser, Debug)]
#[command(name = "mediatree")]
#[command(about = "Browse an Emby or Jellyfin library from the terminal", long_about = None)]
struct Args {
    /// Config file (YAML or TOML)
    #[arg(long, env = "MEDIATREE_CONFIG_PATH")]
    config: Option<String>,

    /// Server URL, overrides server.url from the config
    #[arg(long, env = "MEDIATREE_SERVER")]
    server: Option<String>,

    /// Username to log in with
    #[arg(long, env = "MEDIATREE_USERNAME")]
    username: Option<String>,

    /// Password to log in with
    #[arg(long, env = "MEDIATREE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Existing access token (skips login)
    #[arg(long, env = "MEDIATREE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// User id owning the access token
    #[arg(long, env = "MEDIATREE_USER_ID")]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the library tree, optionally below a path of names or ids
    Tree {
        /// Entries to open, from the top level down
        path: Vec<String>,

        /// Levels to print below the node reached
        #[arg(long, default_value = "1")]
        depth: usize,
    },
    /// Search the library
    Search {
        query: String,
    },
    /// Store the resume position of an item
    Progress {
        item_id: String,

        /// Position in seconds
        seconds: f64,
    },
}

impl Args {
    fn credentials(&self) -> Result<Credentials> {
        match (&self.token, &self.user_id, &self.username, &self.password) {
            (Some(token), Some(user_id), _, _) => Ok(Credentials::Token {
                token: token.clone(),
                user_id: user_id.clone(),
            }),
            (_, _, Some(username), password) => Ok(Credentials::Password {
                username: username.clone(),
                password: password.clone().unwrap_or_default(),
            }),
            _ => Err(anyhow!(
                "Either --token with --user-id or --username (with --password) is required"
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load configuration
    let mut config = load_config(args.config.as_deref())?;
    if let Some(server) = &args.server {
        config.server.url.clone_from(server);
    }

    // 2. Validate configuration (fail fast on misconfigurations)
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    // 3. Initialize logging
    let _log_guard = logging::init_logging(&config.logging)?;
    info!("mediatree starting, server {}", config.server.url);

    // 4. Authenticate and open a session
    let connection = connect(&config, args.credentials()?).await?;
    let loader = LazyLoader::new(connection.session.clone()).with_enrichment(config.library.enrich_on_display);
    let mut store = NavigationStore::new(connection.session.clone());

    // 5. Run the command, giving up on Ctrl-C
    let outcome = tokio::select! {
        result = run(&args.command, &loader, &mut store) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
            Ok(())
        }
    };

    store.reset();
    connection.close().await;
    outcome
}

async fn run(command: &Command, loader: &LazyLoader, store: &mut NavigationStore) -> Result<()> {
    match command {
        Command::Tree { path, depth } => commands::tree(loader, store, path, *depth).await,
        Command::Search { query } => commands::search(loader, store, query).await,
        Command::Progress { item_id, seconds } => commands::progress(loader, item_id, *seconds).await,
    }
}
