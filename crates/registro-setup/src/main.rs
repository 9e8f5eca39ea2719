use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use registro_db::{connection, schema, Connection};
use registro_domain::{find_profile, Insert, Profile, Query};

#[derive(Parser, Debug)]
#[clap(name="registro-setup")]
struct Cli {
    #[clap(long, env = "REGISTRO_DB", default_value="registro.sqlite3")]
    pub db: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and install the schema
    Init,
    /// Manage users
    #[clap(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Add a user
    Add(AddProfile),
    /// List users
    List,
}

#[derive(Args, Debug)]
pub struct AddProfile {
    #[clap(short, long)]
    pub name: String,
    /// Defaults to a random id
    #[clap(short, long)]
    pub id: Option<Uuid>,
}

/// Initialize the database
async fn db_init(filename: &str) -> Result<()> {
    let conn = connection::create(filename).await?;
    schema::install(&conn).await?;
    println!("Database {} ready.", filename);
    Ok(())
}

async fn profile_add(conn: &Connection, cmd: AddProfile) -> Result<Profile> {
    let profiles: Vec<Profile> = conn.query(&()).await?;
    if find_profile(&profiles, &cmd.name).is_some() {
        return Err(anyhow!("a user named {:?} already exists", cmd.name));
    }
    let profile = Profile {
        user_id: cmd.id.unwrap_or_else(Uuid::new_v4),
        full_name: cmd.name,
    };
    conn.insert(profile).await
}

async fn profile_list(conn: &Connection) -> Result<()> {
    let profiles: Vec<Profile> = conn.query(&()).await?;
    for profile in profiles {
        println!("{}\t{}", profile.user_id, profile.full_name);
    }
    Ok(())
}


#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Init => db_init(&cli.db).await?,
        Command::Profile(cmd) => {
            let conn = connection::open(&cli.db).await?;
            match cmd {
                ProfileCommand::Add(cmd) => {
                    let profile = profile_add(&conn, cmd).await?;
                    println!("Added {} ({}).", profile.full_name, profile.user_id);
                },
                ProfileCommand::List => profile_list(&conn).await?,
            }
        },
    }
    Ok(())
}
