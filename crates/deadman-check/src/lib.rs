//! deadman-check: Prometheus alert probe feeding a dead man's switch.
//!
//! Every interval the check asks a Prometheus server for its active
//! alerts and reports the result to a healthchecks.io style service:
//! a success ping when nothing is firing, a failure ping carrying
//! diagnostic context otherwise. The notification service alerts on its
//! own once success pings stop arriving.
//!
//! # Architecture
//!
//! ```text
//! run_check_loop (fixed-rate ticker, one task per cycle)
//!   └── HealthCheck::check()
//!       ├── cycle Deadline (interval)
//!       ├── fetch_alerts() under a request Deadline (timeout) → Outcome
//!       └── Pinger::ping_success / ping_failure under a fresh request Deadline
//! ```
//!
//! # Deadlines
//!
//! Each outbound call gets its own short deadline derived from the cycle
//! deadline. Outcomes are always reported against the cycle deadline, so a
//! monitoring request that timed out still leaves budget for the failure
//! ping.

mod body;

pub mod alerts;
pub mod checker;
pub mod config;
pub mod deadline;
pub mod error;
pub mod failure;
pub mod monitor;
pub mod pinger;

pub use alerts::{Alert, AlertDiscovery, AlertsResponse};
pub use checker::HealthCheck;
pub use config::{CheckConfig, join_path, parse_duration};
pub use deadline::Deadline;
pub use error::{CheckError, ConfigError, ConfigResult};
pub use failure::{Failure, Outcome, failure_message};
pub use monitor::run_check_loop;
pub use pinger::{PingKind, PingResult, Pinger};
