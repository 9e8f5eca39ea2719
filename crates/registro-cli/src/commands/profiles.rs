use anyhow::Result;
use clap::Args;

use registro_domain::{Profile, Store};

use crate::formatting::PrintFormatted;

#[derive(Args, Debug)]
pub struct ListProfiles {}

impl ListProfiles {
    /// Run the command and list users
    pub async fn run<DB: Store>(self, db: &DB) -> Result<()> {
        let profiles: Vec<Profile> = db.query(&()).await?;
        if profiles.is_empty() {
            println!("No users in finance.profiles.");
            return Ok(());
        }
        println!("{} users.", profiles.len());
        profiles.print_formatted();
        Ok(())
    }
}
