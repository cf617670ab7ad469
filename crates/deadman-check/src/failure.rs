//! Check outcomes and the text sent with a failure ping.

use std::fmt::Write as _;

use tracing::{error, warn};

use crate::alerts::Alert;
use crate::error::{CheckError, error_chain};

/// Stand-in for an alert list that could not be serialized.
pub(crate) const MARSHAL_ERROR: &str = "<marshal-error>";

/// Classification of one check cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Prometheus answered and reported no active alerts.
    Success,
    /// Something went wrong, or alerts are firing.
    Failure(Failure),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Why a cycle failed, with the context reported to the notification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The monitoring request could not be built.
    CreateRequest { error: String },
    /// Transport error or request deadline expiry.
    ExecuteRequest { error: String },
    /// Prometheus answered with a non-2xx status.
    UnexpectedStatus { status: String, body: String },
    /// The 2xx body was not a valid alerts response.
    Decode { error: String },
    /// Prometheus reported at least one active alert.
    ActiveAlerts { count: usize, alerts: String },
}

impl Failure {
    /// Build an active-alerts failure, serializing the alerts as compact JSON.
    pub fn active_alerts(alerts: &[Alert]) -> Self {
        let rendered = serde_json::to_string(alerts).unwrap_or_else(|e| {
            warn!(error = %e, "failed to serialize prometheus alerts");
            MARSHAL_ERROR.to_string()
        });
        Failure::ActiveAlerts {
            count: alerts.len(),
            alerts: rendered,
        }
    }

    /// Fixed human-readable message for this kind of failure.
    pub fn message(&self) -> &'static str {
        match self {
            Failure::CreateRequest { .. } => "failed to create monitoring request",
            Failure::ExecuteRequest { .. } => "failed to execute monitoring request",
            Failure::UnexpectedStatus { .. } => {
                "unexpected response status code for monitoring response"
            }
            Failure::Decode { .. } => "failed to decode monitoring response body",
            Failure::ActiveAlerts { .. } => "active alerts reported",
        }
    }

    /// Ordered key/value context sent along with the message.
    pub fn context(&self) -> Vec<(&'static str, &str)> {
        match self {
            Failure::CreateRequest { error }
            | Failure::ExecuteRequest { error }
            | Failure::Decode { error } => vec![("error", error.as_str())],
            Failure::UnexpectedStatus { status, body } => {
                vec![("status", status.as_str()), ("body", body.as_str())]
            }
            Failure::ActiveAlerts { alerts, .. } => vec![("alerts", alerts.as_str())],
        }
    }

    /// Flat single-line text for the failure ping body.
    pub fn render(&self) -> String {
        failure_message(self.message(), &self.context())
    }

    /// Mirror the failure to the log with structured fields.
    pub(crate) fn log(&self) {
        let msg = self.message();
        match self {
            Failure::CreateRequest { error }
            | Failure::ExecuteRequest { error }
            | Failure::Decode { error } => error!(%error, "{msg}"),
            Failure::UnexpectedStatus { status, body } => error!(%status, %body, "{msg}"),
            Failure::ActiveAlerts { count, alerts } => error!(count, %alerts, "{msg}"),
        }
    }
}

impl From<CheckError> for Failure {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::CreateRequest(error) => Failure::CreateRequest { error },
            CheckError::Timeout(budget) => Failure::ExecuteRequest {
                error: CheckError::Timeout(budget).to_string(),
            },
            CheckError::Execute(e) => Failure::ExecuteRequest {
                error: error_chain(&e),
            },
            CheckError::UnexpectedStatus { status, body } => {
                Failure::UnexpectedStatus { status, body }
            }
            CheckError::Decode(error) => Failure::Decode { error },
        }
    }
}

/// Render `msg` followed by ` key=value` for each context pair, in order.
pub fn failure_message(msg: &str, context: &[(&str, &str)]) -> String {
    let mut out = String::from(msg);
    for (key, value) in context {
        let _ = write!(out, " {key}={value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn failure_message_without_context() {
        assert_eq!(failure_message("boom", &[]), "boom");
    }

    #[test]
    fn failure_message_keeps_order() {
        let msg = failure_message(
            "bad",
            &[("status", "503 Service Unavailable"), ("body", "overloaded")],
        );
        assert_eq!(msg, "bad status=503 Service Unavailable body=overloaded");
    }

    #[test]
    fn unexpected_status_render() {
        let failure = Failure::UnexpectedStatus {
            status: "503 Service Unavailable".to_string(),
            body: "overloaded".to_string(),
        };
        let text = failure.render();
        assert!(text.starts_with("unexpected response status code"));
        assert!(text.contains("503"));
        assert!(text.contains("overloaded"));
    }

    #[test]
    fn active_alerts_serializes_list() {
        let alerts = vec![serde_json::json!({"labels": {"alertname": "X"}})];
        let failure = Failure::active_alerts(&alerts);
        assert_eq!(
            failure,
            Failure::ActiveAlerts {
                count: 1,
                alerts: r#"[{"labels":{"alertname":"X"}}]"#.to_string(),
            }
        );
        assert_eq!(
            failure.render(),
            r#"active alerts reported alerts=[{"labels":{"alertname":"X"}}]"#
        );
    }

    #[test]
    fn timeout_maps_to_execute_failure() {
        let failure: Failure = CheckError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(failure.message(), "failed to execute monitoring request");
        assert_eq!(
            failure.context(),
            vec![("error", "request timed out after 30s")]
        );
    }

    #[test]
    fn decode_maps_to_decode_failure() {
        let failure: Failure =
            CheckError::Decode("expected value at line 1".to_string()).into();
        assert_eq!(
            failure.render(),
            "failed to decode monitoring response body error=expected value at line 1"
        );
    }

    #[test]
    fn outcome_success_flag() {
        assert!(Outcome::Success.is_success());
        let failure = Failure::Decode {
            error: String::new(),
        };
        assert!(!Outcome::Failure(failure).is_success());
    }
}
