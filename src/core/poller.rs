use std::{pin::pin, time::Duration};

use bon::Builder;
use chrono::{DateTime, Local, Timelike};
use tokio::time::sleep;

use crate::{
    api::{heartbeat, upstream::Upstream},
    core::{
        metrics::{DerivedMetrics, daily_mix_ratio, derive_current_split, sum_column},
        reading::Column,
        session::SessionManager,
        sink::{Period, Sink, Update},
    },
    error::TickError,
    prelude::*,
};

/// Drives the fetch–derive–publish cycle, one tick at a time.
///
/// A freshly built poller is idle. It polls from the moment [`Poller::run`] is awaited
/// until the shutdown future passed to it resolves.
#[derive(Builder)]
pub struct Poller<U, S> {
    upstream: U,
    sink: S,
    session_manager: SessionManager,
    heartbeat: heartbeat::Client,

    #[builder(into)]
    period: Duration,
}

impl<U: Upstream, S: Sink> Poller<U, S> {
    /// Poll until `shutdown` resolves.
    ///
    /// The next tick is scheduled only after the previous one has finished, so ticks never overlap.
    /// Shutdown is observed between ticks: a tick in flight always runs to completion.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        let mut shutdown = pin!(shutdown);
        info!(period = ?self.period, "polling…");
        loop {
            match self.tick(Local::now()).await {
                Ok(metrics) => {
                    info!(
                        metrics.import_active,
                        metrics.import_pct,
                        metrics.export_active,
                        metrics.export_pct,
                        metrics.daily_mix_ratio,
                        "tick completed",
                    );
                    self.heartbeat.send().await;
                }
                Err(error) => {
                    warn!("tick skipped: {error}");
                }
            }
            tokio::select! {
                () = sleep(self.period) => {}
                () = &mut shutdown => break,
            }
        }
        info!("stopped");
    }

    /// Run a single poll cycle as of the specified local time.
    #[instrument(skip_all, fields(now = %now.format("%H:%M:%S")))]
    pub async fn tick(&mut self, now: DateTime<Local>) -> Result<DerivedMetrics, TickError> {
        let session = self.session_manager.ensure_valid(&self.upstream, now.hour()).await?;

        let reading = self.upstream.get_current_power(session).await?;
        let current = derive_current_split(reading.consumption, reading.production);
        self.sink
            .publish(&Update::pair(Period::Current, current, reading.consumption, reading.production))
            .await
            .map_err(TickError::Publish)?;

        let series = self.upstream.get_daily_series(session, now.date_naive()).await?;
        let production = sum_column(&series, Column::Production);
        let consumption = sum_column(&series, Column::Consumption);
        let daily = derive_current_split(consumption, production);
        let ratio = daily_mix_ratio(production, consumption);
        info!(production, consumption, ratio, "daily totals");
        self.sink
            .publish(&Update::pair(Period::Daily, daily, consumption, production))
            .await
            .map_err(TickError::Publish)?;
        self.sink.publish(&Update::DailyMix { ratio }).await.map_err(TickError::Publish)?;

        Ok(DerivedMetrics::new(current, ratio))
    }
}
