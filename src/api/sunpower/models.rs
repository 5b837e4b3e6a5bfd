use serde::{Deserialize, Serialize};

use crate::{
    api::upstream::Grant,
    core::reading::{DailySeries, InstantReading},
    error::AuthError,
    prelude::*,
};

#[derive(Serialize)]
pub struct AuthenticateRequest<'a> {
    #[serde(rename = "password")]
    pub password: &'a str,

    #[serde(rename = "username")]
    pub username: &'a str,

    #[serde(rename = "isPersistent")]
    pub is_persistent: bool,
}

#[derive(Deserialize)]
pub struct AuthenticateResponse {
    #[serde(rename = "tokenID")]
    token_id: Option<String>,

    #[serde(rename = "addresses", default)]
    addresses: Vec<String>,
}

impl TryFrom<AuthenticateResponse> for Grant {
    type Error = AuthError;

    fn try_from(response: AuthenticateResponse) -> Result<Self, Self::Error> {
        let token = response
            .token_id
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::Malformed("missing `tokenID`".to_owned()))?;
        if response.addresses.len() > 1 {
            warn!(n_addresses = response.addresses.len(), "multiple addresses, using the first one");
        }
        let address = response.addresses.into_iter().next().ok_or(AuthError::NoAddress)?;
        Ok(Self { token, address })
    }
}

#[derive(Deserialize)]
pub struct CurrentPowerResponse {
    #[serde(rename = "data")]
    pub data: InstantReading,
}

#[derive(Deserialize)]
pub struct PowerResponse {
    #[serde(rename = "powerData")]
    pub power_data: DailySeries,
}
