//! SunPower ELH cloud API client.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use http::{
    HeaderMap,
    HeaderValue,
    header::{ACCEPT, AUTHORIZATION},
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use self::models::{AuthenticateRequest, AuthenticateResponse, CurrentPowerResponse, PowerResponse};
use crate::{
    api::upstream::{Grant, Upstream},
    core::{
        reading::{DailySeries, InstantReading},
        session::{Credentials, Session},
    },
    error::{AuthError, UpstreamError},
    prelude::*,
};

pub const DEFAULT_BASE_URL: &str = "https://elhapi.edp.sunpower.com";

/// The API is picky about the clients, so pretend to be the one it knows.
const USER_AGENT: &str = "Mozilla/1.22 (compatible; MSIE 2.0; Windows 3.1)";

pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    pub fn new(base_url: Url) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    /// Every call, including reading the response body, fails once `timeout` elapses.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self> {
        ensure!(!base_url.cannot_be_a_base(), "`{base_url}` cannot be a base URL");
        let mut headers = HeaderMap::new();
        headers.append(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor:
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn current_power_url(&self, address: &str) -> Url {
        self.url(&["v1", "elh", "address", address, "currentpower"])
    }

    fn daily_series_url(&self, address: &str, on: NaiveDate) -> Url {
        let mut url = self.url(&["v2", "elh", "address", address, "power"]);
        url.set_query(Some(&format!("starttime={on}T00:00:00&endtime={on}T23:59:59")));
        url
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(path = url.path()))]
    async fn get<R: DeserializeOwned>(&self, session: &Session, url: Url) -> Result<R, UpstreamError> {
        let path = url.path().to_owned();
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("SP-CUSTOM {}", session.token))
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { path: path.clone(), source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { path, status });
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Transport { path: path.clone(), source })?;
        debug!(n_bytes = body.len(), "call succeeded");
        serde_json::from_slice(&body).map_err(|source| UpstreamError::Malformed { path, source })
    }
}

#[async_trait]
impl Upstream for Api {
    #[instrument(skip_all, fields(username = %credentials.username))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<Grant, AuthError> {
        let response = self
            .client
            .post(self.url(&["v1", "elh", "authenticate"]))
            .json(&AuthenticateRequest {
                password: &credentials.password,
                username: &credentials.username,
                is_persistent: false,
            })
            .send()
            .await
            .map_err(AuthError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected(status));
        }
        let body = response.bytes().await.map_err(AuthError::Transport)?;
        serde_json::from_slice::<AuthenticateResponse>(&body)
            .map_err(|error| AuthError::Malformed(error.to_string()))?
            .try_into()
    }

    #[instrument(skip_all, fields(address = %session.address))]
    async fn get_current_power(&self, session: &Session) -> Result<InstantReading, UpstreamError> {
        let reading = self
            .get::<CurrentPowerResponse>(session, self.current_power_url(&session.address))
            .await?
            .data;
        info!(reading.production, reading.consumption, "fetched");
        Ok(reading)
    }

    #[instrument(skip_all, fields(address = %session.address, on = %on))]
    async fn get_daily_series(
        &self,
        session: &Session,
        on: NaiveDate,
    ) -> Result<DailySeries, UpstreamError> {
        let series = self
            .get::<PowerResponse>(session, self.daily_series_url(&session.address, on))
            .await?
            .power_data;
        info!(n_samples = series.len(), "fetched");
        Ok(series)
    }
}
