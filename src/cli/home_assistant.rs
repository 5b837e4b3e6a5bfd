use clap::Parser;
use reqwest::Url;

use crate::{
    api::home_assistant,
    core::sink::{LogSink, Sink},
    prelude::*,
};

#[derive(Parser)]
pub struct HomeAssistantArgs {
    /// Home Assistant API access token.
    #[clap(
        long = "home-assistant-access-token",
        env = "HOME_ASSISTANT_ACCESS_TOKEN",
        hide_env_values = true
    )]
    access_token: Option<String>,

    /// Home Assistant API base URL. For example: `http://localhost:8123/api`.
    #[clap(long = "home-assistant-api-base-url", env = "HOME_ASSISTANT_API_BASE_URL")]
    base_url: Option<Url>,

    /// Entity ID prefix, for example `sensor.{prefix}_daily_mix`.
    #[clap(
        long = "home-assistant-entity-prefix",
        env = "HOME_ASSISTANT_ENTITY_PREFIX",
        default_value = "sunpower"
    )]
    entity_prefix: String,
}

impl HomeAssistantArgs {
    /// Build the Home Assistant sink, or fall back to logging when it is not configured.
    pub fn new_sink(&self) -> Result<Box<dyn Sink>> {
        match (&self.access_token, &self.base_url) {
            (Some(access_token), Some(base_url)) => Ok(Box::new(home_assistant::Api::new(
                access_token,
                base_url.clone(),
                self.entity_prefix.clone(),
            )?)),
            (None, None) => {
                warn!("Home Assistant is not configured, only logging the updates");
                Ok(Box::new(LogSink))
            }
            _ => bail!("both Home Assistant access token and base URL are required"),
        }
    }
}
