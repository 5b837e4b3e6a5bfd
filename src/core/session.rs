use crate::{api::upstream::Upstream, error::AuthError, prelude::*};

/// Upstream account credentials.
#[derive(Clone, derive_more::Debug)]
pub struct Credentials {
    pub username: String,

    #[debug(skip)]
    pub password: String,
}

/// Authenticated session against the upstream API.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,

    /// First address of the account, other addresses are not supported.
    pub address: String,

    /// Local hour-of-day at which the token was issued.
    pub issued_at_hour: u32,
}

impl Session {
    /// The token expires as soon as the wall clock enters another hour.
    #[must_use]
    pub const fn is_stale_at(&self, hour: u32) -> bool {
        self.issued_at_hour != hour
    }
}

/// Owns the session and refreshes it in hourly buckets.
pub struct SessionManager {
    credentials: Credentials,
    session: Option<Session>,
}

impl SessionManager {
    pub const fn new(credentials: Credentials) -> Self {
        Self { credentials, session: None }
    }

    /// Get the current session, re-authenticating when there is none or it has gone stale.
    ///
    /// A failed refresh keeps the previous state intact.
    #[instrument(skip_all, fields(hour = hour))]
    pub async fn ensure_valid(
        &mut self,
        upstream: &impl Upstream,
        hour: u32,
    ) -> Result<&Session, AuthError> {
        let session = match self.session.take() {
            Some(session) if !session.is_stale_at(hour) => session,
            previous => {
                info!(username = %self.credentials.username, "authenticating…");
                match upstream.authenticate(&self.credentials).await {
                    Ok(grant) => {
                        info!(address = %grant.address, "authenticated");
                        Session { token: grant.token, address: grant.address, issued_at_hour: hour }
                    }
                    Err(error) => {
                        self.session = previous;
                        return Err(error);
                    }
                }
            }
        };
        Ok(&*self.session.insert(session))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use http::StatusCode;

    use super::*;
    use crate::{
        api::upstream::Grant,
        core::reading::{DailySeries, InstantReading},
        error::UpstreamError,
    };

    /// Hands out numbered tokens, or rejects when told to.
    #[derive(Default)]
    struct FakeAuthenticator {
        n_calls: AtomicUsize,
        reject: Mutex<bool>,
    }

    #[async_trait]
    impl Upstream for FakeAuthenticator {
        async fn authenticate(&self, credentials: &Credentials) -> Result<Grant, AuthError> {
            let n_calls = self.n_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if *self.reject.lock().unwrap() {
                return Err(AuthError::Rejected(StatusCode::UNAUTHORIZED));
            }
            Ok(Grant {
                token: format!("{}-{n_calls}", credentials.username),
                address: "address-1".to_owned(),
            })
        }

        async fn get_current_power(&self, _: &Session) -> Result<InstantReading, UpstreamError> {
            unimplemented!()
        }

        async fn get_daily_series(
            &self,
            _: &Session,
            _: NaiveDate,
        ) -> Result<DailySeries, UpstreamError> {
            unimplemented!()
        }
    }

    fn credentials() -> Credentials {
        Credentials { username: "user".to_owned(), password: "secret".to_owned() }
    }

    #[tokio::test]
    async fn authenticates_on_first_use() -> Result {
        let upstream = FakeAuthenticator::default();
        let mut manager = SessionManager::new(credentials());
        assert!(manager.session.is_none());

        let session = manager.ensure_valid(&upstream, 9).await?;
        assert_eq!(session.token, "user-1");
        assert_eq!(session.address, "address-1");
        assert_eq!(session.issued_at_hour, 9);
        Ok(())
    }

    #[tokio::test]
    async fn reuses_token_within_the_hour() -> Result {
        let upstream = FakeAuthenticator::default();
        let mut manager = SessionManager::new(credentials());
        manager.ensure_valid(&upstream, 9).await?;
        let session = manager.ensure_valid(&upstream, 9).await?;
        assert_eq!(session.token, "user-1");
        assert_eq!(upstream.n_calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn refreshes_on_hour_boundary() -> Result {
        // 09:59 and 10:00 are only a minute apart, but fall into different buckets.
        let upstream = FakeAuthenticator::default();
        let mut manager = SessionManager::new(credentials());
        manager.ensure_valid(&upstream, 9).await?;
        assert!(manager.session.as_ref().is_some_and(|session| session.is_stale_at(10)));

        let session = manager.ensure_valid(&upstream, 10).await?;
        assert_eq!(session.token, "user-2");
        assert_eq!(session.issued_at_hour, 10);
        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_session() -> Result {
        let upstream = FakeAuthenticator::default();
        let mut manager = SessionManager::new(credentials());
        let previous = manager.ensure_valid(&upstream, 9).await?.clone();

        *upstream.reject.lock().unwrap() = true;
        let result = manager.ensure_valid(&upstream, 10).await;
        assert!(matches!(result, Err(AuthError::Rejected(StatusCode::UNAUTHORIZED))));
        assert_eq!(manager.session.as_ref(), Some(&previous));

        // Still stale, so the next tick tries again:
        assert!(previous.is_stale_at(10));
        *upstream.reject.lock().unwrap() = false;
        assert_eq!(manager.ensure_valid(&upstream, 10).await?.token, "user-3");
        Ok(())
    }

    #[tokio::test]
    async fn failed_first_authentication_leaves_no_session() {
        let upstream = FakeAuthenticator { reject: Mutex::new(true), ..Default::default() };
        let mut manager = SessionManager::new(credentials());
        assert!(manager.ensure_valid(&upstream, 9).await.is_err());
        assert_eq!(manager.session, None);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("user"));
        assert!(!debug.contains("secret"));
    }
}
