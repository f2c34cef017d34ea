//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Negotiation and HTTP layers produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (negotiation outcome and response counters)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Expected rejections (412) are logged at debug, never as faults
//! - Metrics are cheap counter increments; without an installed recorder
//!   they are no-ops

pub mod logging;
pub mod metrics;
