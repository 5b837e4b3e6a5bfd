//! Home Assistant sink writing entity states via the REST API.

use std::time::Duration;

use async_trait::async_trait;
use http::{
    HeaderMap,
    HeaderValue,
    header::AUTHORIZATION,
};
use reqwest::{Client, Url};
use serde::Serialize;

use crate::{
    core::sink::{LightStatus, Sink, Update},
    prelude::*,
};

pub struct Api {
    client: Client,
    base_url: Url,
    entity_prefix: String,
}

impl Api {
    /// Base URL includes the `/api` part, for example: `http://localhost:8123/api`.
    pub fn new(access_token: &str, base_url: Url, entity_prefix: String) -> Result<Self> {
        ensure!(!base_url.cannot_be_a_base(), "`{base_url}` cannot be a base URL");
        let headers = HeaderMap::from_iter([(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {access_token}"))?,
        )]);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url, entity_prefix })
    }

    fn entity_id(&self, suffix: &str) -> String {
        format!("sensor.{}_{suffix}", self.entity_prefix)
    }

    #[instrument(skip_all, fields(entity_id = entity_id))]
    async fn set_state<A: Serialize + Sync>(&self, entity_id: &str, state: &NewState<'_, A>) -> Result {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .pop_if_empty()
            .push("states")
            .push(entity_id);
        self.client
            .post(url)
            .json(state)
            .send()
            .await
            .with_context(|| format!("failed to set `{entity_id}` state"))?
            .error_for_status()
            .with_context(|| format!("setting `{entity_id}` state failed"))?;
        debug!(state = state.state, "updated");
        Ok(())
    }

    async fn set_light(&self, entity_id: &str, status: &LightStatus) -> Result {
        let state = NewState {
            state: if status.is_on { "on" } else { "off" },
            attributes: LightAttributes {
                brightness_pct: status.brightness,
                level: status.level,
                icon: "mdi:lightbulb",
            },
        };
        self.set_state(entity_id, &state).await
    }
}

#[async_trait]
impl Sink for Api {
    async fn publish(&self, update: &Update) -> Result {
        match update {
            Update::Pair { period, import, export } => {
                self.set_light(&self.entity_id(&format!("{period}_import")), import).await?;
                self.set_light(&self.entity_id(&format!("{period}_export")), export).await?;
            }
            Update::DailyMix { ratio } => {
                let state = NewState {
                    state: &format!("{:.1}", humidity_percent(*ratio)),
                    attributes: MixAttributes { unit_of_measurement: "%", icon: "mdi:solar-power" },
                };
                self.set_state(&self.entity_id("daily_mix"), &state).await?;
            }
        }
        Ok(())
    }
}

/// Relative-humidity-like scalar of the mix ratio.
fn humidity_percent(ratio: f64) -> f64 {
    (ratio * 100.0).clamp(0.0, 100.0)
}

#[derive(Serialize)]
struct NewState<'a, A> {
    state: &'a str,
    attributes: A,
}

#[derive(Serialize)]
struct LightAttributes {
    brightness_pct: f64,
    level: f64,
    icon: &'static str,
}

#[derive(Serialize)]
struct MixAttributes {
    unit_of_measurement: &'static str,
    icon: &'static str,
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;
    use crate::core::sink::Period;

    #[test]
    fn humidity_percent_ok() {
        assert!((humidity_percent(0.3) - 30.0).abs() < 1e-9);
        assert!((humidity_percent(1.7) - 100.0).abs() < f64::EPSILON);
        assert!(humidity_percent(0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn publish_pair_ok() -> Result {
        let mut server = Server::new_async().await;
        let import = server
            .mock("POST", "/api/states/sensor.sunpower_current_import")
            .match_header("authorization", "Bearer token")
            .match_body(Matcher::Json(json!({
                "state": "on",
                "attributes": {"brightness_pct": 75.0, "level": 800.0, "icon": "mdi:lightbulb"},
            })))
            .with_status(200)
            .create_async()
            .await;
        let export = server
            .mock("POST", "/api/states/sensor.sunpower_current_export")
            .match_body(Matcher::Json(json!({
                "state": "off",
                "attributes": {"brightness_pct": 0.0, "level": 200.0, "icon": "mdi:lightbulb"},
            })))
            .with_status(200)
            .create_async()
            .await;

        let api = Api::new("token", format!("{}/api", server.url()).parse()?, "sunpower".to_owned())?;
        api.publish(&Update::Pair {
            period: Period::Current,
            import: LightStatus { is_on: true, brightness: 75.0, level: 800.0 },
            export: LightStatus { is_on: false, brightness: 0.0, level: 200.0 },
        })
        .await?;

        import.assert_async().await;
        export.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn publish_daily_mix_ok() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/states/sensor.roof_daily_mix")
            .match_body(Matcher::PartialJson(json!({"state": "30.0"})))
            .with_status(201)
            .create_async()
            .await;

        let api = Api::new("token", format!("{}/api/", server.url()).parse()?, "roof".to_owned())?;
        api.publish(&Update::DailyMix { ratio: 0.3 }).await?;
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn publish_failure() -> Result {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/states/sensor.sunpower_daily_mix")
            .with_status(401)
            .create_async()
            .await;

        let api = Api::new("token", format!("{}/api", server.url()).parse()?, "sunpower".to_owned())?;
        assert!(api.publish(&Update::DailyMix { ratio: 0.5 }).await.is_err());
        Ok(())
    }
}
