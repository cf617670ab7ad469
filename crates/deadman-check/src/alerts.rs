//! Prometheus `/api/v1/alerts` response payload.
//!
//! Only the envelope is typed. Alerts themselves are passed through as raw
//! JSON so they can be counted and echoed back in the failure ping.

use serde::{Deserialize, Serialize};

/// A single active alert, left uninterpreted.
pub type Alert = serde_json::Value;

/// Top-level response of `GET /api/v1/alerts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertsResponse {
    pub data: AlertDiscovery,
}

/// The `data` member of the alerts response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertDiscovery {
    pub alerts: Vec<Alert>,
}
