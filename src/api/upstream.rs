use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    core::{
        reading::{DailySeries, InstantReading},
        session::{Credentials, Session},
    },
    error::{AuthError, UpstreamError},
};

/// Token and account address granted by a successful authentication.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grant {
    pub token: String,
    pub address: String,
}

/// Monitoring API the poller talks to.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Grant, AuthError>;

    /// Instantaneous production and consumption.
    async fn get_current_power(&self, session: &Session) -> Result<InstantReading, UpstreamError>;

    /// Series spanning the entire local calendar day.
    async fn get_daily_series(
        &self,
        session: &Session,
        on: NaiveDate,
    ) -> Result<DailySeries, UpstreamError>;
}
