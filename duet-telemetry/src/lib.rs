//! # duet-telemetry
//!
//! Structured logging and distributed tracing for duet pipelines.
//!
//! ## Usage
//!
//! ```rust
//! use duet_telemetry::{init_telemetry, info};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry("duet")?;
//!     info!("pipeline ready");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{init_telemetry, init_with_otlp, shutdown_telemetry};
pub use spans::*;
