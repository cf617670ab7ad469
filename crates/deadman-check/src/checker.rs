//! The check cycle.
//!
//! Asks Prometheus for its active alerts, classifies the answer and
//! reports the classification to the healthchecks service.

use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::alerts::{Alert, AlertsResponse};
use crate::body::{self, BodyError, READ_ERROR};
use crate::config::{CheckConfig, join_path};
use crate::deadline::Deadline;
use crate::error::CheckError;
use crate::failure::{Failure, Outcome};
use crate::pinger::Pinger;

/// One configured check: the monitoring probe plus its pinger.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    config: CheckConfig,
    client: Client,
    pinger: Pinger,
}

impl HealthCheck {
    /// Create a check. `client` is shared with the pinger; pass a clone of
    /// the process-wide client so all calls use one connection pool.
    pub fn new(config: CheckConfig, client: Client) -> Self {
        let pinger = Pinger::new(client.clone(), &config);
        Self {
            config,
            client,
            pinger,
        }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run one cycle and return its outcome.
    ///
    /// The outcome has already been reported by the time this returns.
    /// Ping delivery problems are logged but never change the outcome.
    pub async fn check(&self) -> Outcome {
        let cycle = Deadline::after(self.config.interval);

        let outcome = match self.fetch_alerts(cycle).await {
            Ok(alerts) if alerts.is_empty() => Outcome::Success,
            Ok(alerts) => Outcome::Failure(Failure::active_alerts(&alerts)),
            Err(e) => Outcome::Failure(e.into()),
        };

        // Report against the cycle deadline, not the request deadline,
        // which may already have expired.
        match &outcome {
            Outcome::Success => {
                self.pinger.ping_success(cycle).await;
            }
            Outcome::Failure(failure) => {
                self.pinger.ping_failure(cycle, failure).await;
            }
        }

        outcome
    }

    /// `GET <prometheus>/api/v1/alerts` under a request deadline derived
    /// from `cycle`.
    pub async fn fetch_alerts(&self, cycle: Deadline) -> Result<Vec<Alert>, CheckError> {
        let deadline = cycle.child(self.config.timeout);
        let budget = deadline.remaining();

        let url = join_path(&self.config.prometheus_base_url, &["api", "v1", "alerts"])
            .map_err(|e| CheckError::CreateRequest(e.to_string()))?;
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .build()
            .map_err(|e| CheckError::CreateRequest(e.to_string()))?;

        let response = deadline
            .run(self.client.execute(request))
            .await
            .map_err(|_| CheckError::Timeout(budget))?
            .map_err(CheckError::Execute)?;

        let status = response.status();
        if !status.is_success() {
            let body = body::read_text(deadline, response)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "failed to read prometheus response body");
                    READ_ERROR.to_string()
                });
            return Err(CheckError::UnexpectedStatus {
                status: status.to_string(),
                body,
            });
        }

        let bytes = body::read_bytes(deadline, response)
            .await
            .map_err(|e| match e {
                BodyError::Timeout => CheckError::Timeout(budget),
                BodyError::Read(e) => CheckError::Decode(e.to_string()),
            })?;
        let decoded: AlertsResponse =
            serde_json::from_slice(&bytes).map_err(|e| CheckError::Decode(e.to_string()))?;

        debug!(
            alerts = decoded.data.alerts.len(),
            remaining = ?cycle.remaining(),
            "prometheus alerts fetched"
        );
        Ok(decoded.data.alerts)
    }
}
