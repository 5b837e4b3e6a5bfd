use async_trait::async_trait;

use crate::{core::metrics::Split, prelude::*};

/// Which totals a bulb pair reflects.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Period {
    #[display("current")]
    Current,

    #[display("daily")]
    Daily,
}

/// Light-bulb-like value set of a single import or export indicator.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightStatus {
    pub is_on: bool,

    /// Percent, `0..=100`.
    pub brightness: f64,

    /// Pass-through power or energy.
    pub level: f64,
}

/// Sensor update produced by a poll cycle.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Update {
    /// Import and export indicator pair.
    Pair { period: Period, import: LightStatus, export: LightStatus },

    /// Daily production over daily consumption.
    DailyMix { ratio: f64 },
}

impl Update {
    /// Build the indicator pair: import carries the consumption, export carries the production.
    pub const fn pair(period: Period, split: Split, consumption: f64, production: f64) -> Self {
        Self::Pair {
            period,
            import: LightStatus {
                is_on: split.import_active,
                brightness: split.import_pct,
                level: consumption,
            },
            export: LightStatus {
                is_on: split.export_active,
                brightness: split.export_pct,
                level: production,
            },
        }
    }
}

/// Smart-home side receiving the sensor updates.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn publish(&self, update: &Update) -> Result;
}

#[async_trait]
impl<S: Sink + ?Sized> Sink for Box<S> {
    async fn publish(&self, update: &Update) -> Result {
        (**self).publish(update).await
    }
}

/// Dry-run sink which only logs the updates.
pub struct LogSink;

#[async_trait]
impl Sink for LogSink {
    async fn publish(&self, update: &Update) -> Result {
        match update {
            Update::Pair { period, import, export } => {
                info!(
                    %period,
                    import.is_on,
                    import.brightness,
                    import.level,
                    export.is_on,
                    export.brightness,
                    export.level,
                    "pair",
                );
            }
            Update::DailyMix { ratio } => {
                info!(ratio, "daily mix");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::derive_current_split;

    #[test]
    fn pair_passes_levels_through() {
        let update = Update::pair(Period::Current, derive_current_split(800.0, 200.0), 800.0, 200.0);
        assert_eq!(
            update,
            Update::Pair {
                period: Period::Current,
                import: LightStatus { is_on: true, brightness: 75.0, level: 800.0 },
                export: LightStatus { is_on: false, brightness: 0.0, level: 200.0 },
            }
        );
    }

    #[tokio::test]
    async fn log_sink_ok() -> Result {
        LogSink.publish(&Update::DailyMix { ratio: 0.3 }).await
    }
}
