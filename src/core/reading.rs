use std::str::FromStr;

use serde::Deserialize;
use serde_with::serde_as;

use crate::prelude::*;

/// Instantaneous power at poll time, in watts.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawInstantReading")]
pub struct InstantReading {
    pub production: f64,
    pub consumption: f64,
}

#[serde_as]
#[derive(Deserialize)]
struct RawInstantReading {
    #[serde_as(as = "serde_with::PickFirst<(_, serde_with::DisplayFromStr)>")]
    #[serde(rename = "production")]
    production: f64,

    #[serde_as(as = "serde_with::PickFirst<(_, serde_with::DisplayFromStr)>")]
    #[serde(rename = "consumption")]
    consumption: f64,
}

impl TryFrom<RawInstantReading> for InstantReading {
    type Error = Error;

    fn try_from(raw: RawInstantReading) -> Result<Self> {
        ensure!(raw.production.is_finite(), "non-finite production `{}`", raw.production);
        ensure!(raw.consumption.is_finite(), "non-finite consumption `{}`", raw.consumption);
        Ok(Self { production: raw.production, consumption: raw.consumption })
    }
}

/// Numeric column of a `timestamp,production,consumption` record.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Column {
    Production,
    Consumption,
}

impl Column {
    /// Field index within a comma-delimited record.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Production => 1,
            Self::Consumption => 2,
        }
    }

    /// Parse the column out of the raw record.
    ///
    /// Missing, unparsable and non-finite fields yield zero.
    #[must_use]
    pub fn parse(self, record: &str) -> f64 {
        match record.split(',').nth(self.index()).map(str::trim) {
            None | Some("") => 0.0,
            Some(field) => {
                f64::from_str(field).ok().filter(|value| value.is_finite()).unwrap_or_else(|| {
                    debug!(record, column = ?self, "malformed sample, defaulting to zero");
                    0.0
                })
            }
        }
    }
}

/// Single interval of the daily series.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: String,
    pub production: f64,
    pub consumption: f64,
}

impl Sample {
    pub fn from_record(record: &str) -> Self {
        Self {
            timestamp: record.split(',').next().unwrap_or_default().trim().to_owned(),
            production: Column::Production.parse(record),
            consumption: Column::Consumption.parse(record),
        }
    }

    #[must_use]
    pub const fn get(&self, column: Column) -> f64 {
        match column {
            Column::Production => self.production,
            Column::Consumption => self.consumption,
        }
    }
}

/// Samples covering the current local calendar day, in the upstream order.
#[must_use]
#[derive(Clone, Debug, Default, Deserialize, derive_more::Index, derive_more::IntoIterator)]
#[serde(from = "Vec<String>")]
pub struct DailySeries(#[into_iterator(owned, ref)] pub Vec<Sample>);

impl DailySeries {
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(records.into_iter().map(|record| Sample::from_record(record.as_ref())).collect())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for DailySeries {
    fn from(records: Vec<String>) -> Self {
        Self::from_records(records)
    }
}
