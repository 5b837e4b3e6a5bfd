use clap::Parser;
use reqwest::Url;
use tokio::signal::ctrl_c;

use crate::{
    api::heartbeat,
    cli::{home_assistant::HomeAssistantArgs, sunpower::SunPowerArgs},
    core::{poller::Poller, session::SessionManager},
    prelude::*,
};

#[derive(Parser)]
pub struct PollArgs {
    #[clap(flatten)]
    sunpower: SunPowerArgs,

    #[clap(long, env = "POLLING_INTERVAL", default_value = "30s")]
    polling_interval: humantime::Duration,

    #[clap(flatten)]
    home_assistant: HomeAssistantArgs,

    #[clap(long = "heartbeat-url", env = "HEARTBEAT_URL")]
    heartbeat_url: Option<Url>,
}

impl PollArgs {
    pub async fn run(self) -> Result {
        let mut poller = Poller::builder()
            .upstream(self.sunpower.new_client()?)
            .sink(self.home_assistant.new_sink()?)
            .session_manager(SessionManager::new(self.sunpower.credentials()))
            .heartbeat(heartbeat::Client::new(self.heartbeat_url)?)
            .period(self.polling_interval)
            .build();
        let mut interrupted = Ok(());
        poller.run(async { interrupted = ctrl_c().await }).await;
        interrupted.context("failed to listen for Ctrl-C")?;
        info!("interrupted");
        Ok(())
    }
}
