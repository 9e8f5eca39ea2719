use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use registro_db::{CacheConfig, RestConfig};
use registro_domain::Store;

use crate::commands::{
    AddEntry,
    ListProfiles,
    Session,
    ShowDashboard,
    ShowHistory,
};

#[derive(Parser, Debug)]
#[clap(name = "registro", version=env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Project url of the remote store
    #[clap(long, env = "SUPABASE_URL")]
    pub url: Option<String>,
    /// Service role key of the remote store
    #[clap(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub key: Option<String>,
    #[clap(long, env = "REGISTRO_SCHEMA", default_value = "finance")]
    pub schema: String,
    /// Use a local database instead of the remote store
    #[clap(long, env = "REGISTRO_DB")]
    pub db: Option<String>,

    /// Request timeout in seconds
    #[clap(long, default_value_t = 30)]
    pub timeout: u64,
    #[clap(long, default_value_t = 60)]
    pub profiles_ttl: u64,
    #[clap(long, default_value_t = 30)]
    pub summary_ttl: u64,
    #[clap(long, default_value_t = 30)]
    pub entries_ttl: u64,

    /// More log output, repeat for more
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }

    /// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            profiles: Duration::from_secs(self.profiles_ttl),
            summary: Duration::from_secs(self.summary_ttl),
            entries: Duration::from_secs(self.entries_ttl),
        }
    }

    pub fn rest_config(&self) -> Result<RestConfig> {
        let url = self.url.clone()
            .ok_or_else(|| anyhow!("missing SUPABASE_URL (or pass --db for a local database)"))?;
        let key = self.key.clone()
            .ok_or_else(|| anyhow!("missing SUPABASE_SERVICE_ROLE_KEY"))?;
        Ok(RestConfig {
            url,
            key,
            schema: self.schema.clone(),
            timeout: Duration::from_secs(self.timeout),
        })
    }
}


#[derive(Subcommand, Debug)]
pub enum Command {
    /// List users
    #[clap(name = "profiles")]
    Profiles(ListProfiles),
    /// Record an entry
    #[clap(name = "add")]
    Add(AddEntry),
    /// Show savings and the monthly view
    #[clap(name = "dashboard")]
    Dashboard(ShowDashboard),
    /// Show recorded entries
    #[clap(name = "history")]
    History(ShowHistory),
    /// Interactive session
    #[clap(name = "session")]
    Session(Session),
}

impl Command {
    pub async fn run<DB: Store>(self, db: &DB) -> Result<()> {
        match self {
            Command::Profiles(cmd) => cmd.run(db).await,
            Command::Add(cmd) => cmd.run(db).await,
            Command::Dashboard(cmd) => cmd.run(db).await,
            Command::History(cmd) => cmd.run(db).await,
            Command::Session(cmd) => cmd.run(db).await,
        }
    }
}
