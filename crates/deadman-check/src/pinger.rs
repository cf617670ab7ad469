//! Pings to the healthchecks service.
//!
//! Pings are fire-and-forget: every error is logged and swallowed, and
//! nothing here can change the outcome of the cycle that sent them.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use tracing::{debug, error, info, warn};

use crate::body::{self, READ_ERROR};
use crate::config::{CheckConfig, join_path};
use crate::deadline::Deadline;
use crate::error::{ConfigResult, error_chain};
use crate::failure::Failure;

/// Which signal a ping carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingKind {
    Success,
    Failure,
}

impl PingKind {
    pub fn name(&self) -> &'static str {
        match self {
            PingKind::Success => "success",
            PingKind::Failure => "failure",
        }
    }
}

/// Result of delivering a single ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingResult {
    /// The service answered 2xx.
    Delivered,
    /// The service answered non-2xx.
    Rejected,
    /// The ping could not be built or sent, or ran out of time.
    Failed,
}

/// Sends success and failure pings for one check.
#[derive(Debug, Clone)]
pub struct Pinger {
    client: Client,
    base_url: Url,
    check_uuid: String,
    timeout: Duration,
}

impl Pinger {
    /// Create a pinger sharing `client`'s connection pool.
    pub fn new(client: Client, config: &CheckConfig) -> Self {
        Self {
            client,
            base_url: config.healthchecks_base_url.clone(),
            check_uuid: config.check_uuid.clone(),
            timeout: config.timeout,
        }
    }

    /// `GET <base>/<uuid>` with no body.
    pub async fn ping_success(&self, parent: Deadline) -> PingResult {
        info!("success");

        let url = join_path(&self.base_url, &[self.check_uuid.as_str()]);
        self.ping(parent, PingKind::Success, Method::GET, url, None)
            .await
    }

    /// `POST <base>/<uuid>/fail` with the rendered failure as body.
    pub async fn ping_failure(&self, parent: Deadline, failure: &Failure) -> PingResult {
        failure.log();

        let url = join_path(&self.base_url, &[self.check_uuid.as_str(), "fail"]);
        self.ping(
            parent,
            PingKind::Failure,
            Method::POST,
            url,
            Some(failure.render()),
        )
        .await
    }

    async fn ping(
        &self,
        parent: Deadline,
        kind: PingKind,
        method: Method,
        url: ConfigResult<Url>,
        body: Option<String>,
    ) -> PingResult {
        let ping = kind.name();
        let deadline = parent.child(self.timeout);
        let budget = deadline.remaining();

        let url = match url {
            Ok(url) => url,
            Err(e) => {
                error!(ping, error = %e, "failed to create ping request");
                return PingResult::Failed;
            }
        };

        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(body);
        }
        let request = match builder.build() {
            Ok(request) => request,
            Err(e) => {
                error!(ping, error = %error_chain(&e), "failed to create ping request");
                return PingResult::Failed;
            }
        };

        let response = match deadline.run(self.client.execute(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(ping, error = %error_chain(&e), "failed to execute ping request");
                return PingResult::Failed;
            }
            Err(_) => {
                error!(ping, budget = ?budget, "ping request timed out");
                return PingResult::Failed;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = body::read_text(deadline, response)
                .await
                .unwrap_or_else(|e| {
                    warn!(ping, error = %e, "failed to read ping response body");
                    READ_ERROR.to_string()
                });
            error!(ping, %status, %body, "unexpected response status code for ping response");
            return PingResult::Rejected;
        }

        match body::drain(deadline, response).await {
            Ok(discarded) => debug!(ping, %status, discarded, "ping delivered"),
            Err(e) => warn!(ping, error = %e, "failed to read ping response body to EOF"),
        }
        PingResult::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_kind_names() {
        assert_eq!(PingKind::Success.name(), "success");
        assert_eq!(PingKind::Failure.name(), "failure");
    }

    #[tokio::test]
    async fn ping_to_closed_port_returns_failed() {
        let config = CheckConfig::new(
            "check",
            Url::parse("http://127.0.0.1:1").unwrap(),
            Url::parse("http://127.0.0.1:1").unwrap(),
        )
        .with_timeout(Duration::from_millis(500));
        let pinger = Pinger::new(Client::new(), &config);

        let parent = Deadline::after(Duration::from_secs(5));
        assert_eq!(pinger.ping_success(parent).await, PingResult::Failed);
    }

    #[tokio::test]
    async fn ping_with_non_base_url_returns_failed() {
        let mut config = CheckConfig::new(
            "check",
            Url::parse("http://127.0.0.1:1").unwrap(),
            Url::parse("http://127.0.0.1:1").unwrap(),
        );
        config.healthchecks_base_url = Url::parse("mailto:ops@example.com").unwrap();
        let pinger = Pinger::new(Client::new(), &config);

        let failure = Failure::Decode {
            error: "eof".to_string(),
        };
        let parent = Deadline::after(Duration::from_secs(5));
        assert_eq!(
            pinger.ping_failure(parent, &failure).await,
            PingResult::Failed
        );
    }
}
