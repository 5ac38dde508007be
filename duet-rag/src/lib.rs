//! # duet-rag
//!
//! Retrieval for duet agents: an immutable [`TipStore`], the
//! [`KeywordRetriever`] over it, the async [`Retriever`] seam for other
//! backends, and [`RetrievalTool`] exposing retrieval to the model.
//!
//! ```rust
//! use duet_rag::{KeywordRetriever, TipStore};
//! use std::sync::Arc;
//!
//! let retriever = KeywordRetriever::new(Arc::new(TipStore::default()));
//! assert!(retriever.render("HIIT workout").contains("Fitness Guru"));
//! ```

pub mod retriever;
pub mod store;
pub mod tool;

pub use retriever::{KeywordRetriever, Retriever};
pub use store::{Tip, TipStore, render_tips};
pub use tool::{RETRIEVAL_TOOL_NAME, RetrievalTool};
