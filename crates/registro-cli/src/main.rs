use anyhow::Result;
use tracing::debug;

use registro_db::{connection, Cached, RestClient};
use registro_cli::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::init();
    cli.init_logging();

    let cache = cli.cache_config();
    match &cli.db {
        Some(filename) => {
            debug!(filename = %filename, "using local database");
            let conn = connection::open(filename).await?;
            cli.command.run(&Cached::new(conn, &cache)).await
        },
        None => {
            let config = cli.rest_config()?;
            debug!(url = %config.url, schema = %config.schema, "using remote store");
            let client = RestClient::new(config)?;
            cli.command.run(&Cached::new(client, &cache)).await
        },
    }
}
