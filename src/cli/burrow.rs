use chrono::{Local, Timelike};
use clap::{Parser, Subcommand};

use crate::{
    api::upstream::Upstream,
    cli::sunpower::SunPowerArgs,
    core::{metrics::derive_current_split, session::SessionManager},
    prelude::*,
    tables::{build_current_table, build_daily_series_table},
};

#[derive(Parser)]
pub struct BurrowArgs {
    #[clap(flatten)]
    sunpower: SunPowerArgs,

    #[command(subcommand)]
    command: BurrowCommand,
}

#[derive(Subcommand)]
pub enum BurrowCommand {
    /// Fetch the current power and show the import/export split.
    Current,

    /// Fetch today's power series.
    Daily,
}

impl BurrowArgs {
    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        let api = self.sunpower.new_client()?;
        let now = Local::now();
        let mut session_manager = SessionManager::new(self.sunpower.credentials());
        let session = session_manager.ensure_valid(&api, now.hour()).await?;

        match self.command {
            BurrowCommand::Current => {
                let reading = api.get_current_power(session).await?;
                let split = derive_current_split(reading.consumption, reading.production);
                println!("{}", build_current_table(&reading, &split));
            }
            BurrowCommand::Daily => {
                let series = api.get_daily_series(session, now.date_naive()).await?;
                if series.is_empty() {
                    warn!("no samples for today yet");
                }
                println!("{}", build_daily_series_table(&series));
            }
        }

        Ok(())
    }
}
