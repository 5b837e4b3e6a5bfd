use std::time::Duration;

use reqwest::{Client as HttpClient, Url};

use crate::prelude::*;

/// Optional liveness ping after each successful poll.
pub struct Client {
    url: Option<Url>,
    inner: HttpClient,
}

impl Client {
    pub fn new(url: Option<Url>) -> Result<Self> {
        let inner = HttpClient::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .context("failed to build the heartbeat client")?;
        Ok(Self { url, inner })
    }

    pub async fn send(&self) {
        if let Some(url) = &self.url
            && let Err(error) = self.send_fallible(url.clone()).await
        {
            warn!("failed to send the heartbeat: {error:#}");
        }
    }

    #[instrument(skip_all)]
    async fn send_fallible(&self, url: Url) -> Result {
        debug!("sending a heartbeat…");
        self.inner.post(url).send().await?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;

    use super::*;

    #[tokio::test]
    async fn send_ok() -> Result {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/ping").with_status(200).create_async().await;
        Client::new(Some(format!("{}/ping", server.url()).parse()?))?.send().await;
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn client_is_reused_across_sends() -> Result {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/ping").with_status(200).expect(3).create_async().await;
        let client = Client::new(Some(format!("{}/ping", server.url()).parse()?))?;
        for _ in 0..3 {
            client.send().await;
        }
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn send_without_url_is_noop() -> Result {
        Client::new(None)?.send().await;
        Ok(())
    }

    #[tokio::test]
    async fn send_failure_is_swallowed() -> Result {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/ping").with_status(500).create_async().await;
        Client::new(Some(format!("{}/ping", server.url()).parse()?))?.send().await;
        mock.assert_async().await;
        Ok(())
    }
}
