use clap::Parser;
use reqwest::Url;

use crate::{
    api::sunpower::{Api, DEFAULT_BASE_URL},
    core::session::Credentials,
    prelude::*,
};

#[derive(Parser)]
pub struct SunPowerArgs {
    #[clap(long = "username", env = "SUNPOWER_USERNAME")]
    username: String,

    #[clap(long = "password", env = "SUNPOWER_PASSWORD", hide_env_values = true)]
    password: String,

    #[clap(long = "api-base-url", env = "SUNPOWER_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: Url,
}

impl SunPowerArgs {
    pub fn credentials(&self) -> Credentials {
        Credentials { username: self.username.clone(), password: self.password.clone() }
    }

    pub fn new_client(&self) -> Result<Api> {
        Api::new(self.base_url.clone())
    }
}
