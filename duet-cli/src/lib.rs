//! # duet-cli
//!
//! Command-line front end for the duet pipeline.
//!
//! - `duet ask <QUERY>` - one run, printing the transcript and final answer
//! - `duet console` - interactive REPL, one run per line
//! - `duet tips [QUERY]` - inspect the tip store without calling a model
//!
//! ```rust,no_run
//! use duet_cli::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let coordinator = Config::offline().build_coordinator()?;
//!     let outcome = coordinator.run("HIIT workout").await?;
//!     println!("{}", duet_cli::console::format_outcome(&outcome));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod console;
pub mod offline;

pub use config::{Config, ModelSource, load_store, tip_listing};
