//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → Load config → Validate → Init logging/metrics → Bind → Serve
//!
//! Shutdown:
//!     signals.rs (SIGINT/SIGTERM) → Shutdown::trigger
//!     → HttpServer stops accepting, drains in-flight requests → Exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
