use crate::store::{Tip, TipStore, render_tips};
use async_trait::async_trait;
use duet_core::Result;
use std::collections::HashSet;
use std::sync::Arc;

/// Source of tips for a query. Implementations backed by I/O may fail.
#[async_trait]
pub trait Retriever: Send + Sync {
    fn name(&self) -> &str;

    /// Tips relevant to `query`. Never empty on success.
    async fn retrieve(&self, query: &str) -> Result<Vec<Tip>>;
}

/// Substring keyword matcher over an in-memory [`TipStore`].
///
/// A tip matches when any lowercased, whitespace-separated query word occurs
/// anywhere in its lowercased content. No ranking or stemming. When nothing
/// matches (including the empty query) every tip is returned.
#[derive(Debug, Clone)]
pub struct KeywordRetriever {
    store: Arc<TipStore>,
}

impl KeywordRetriever {
    pub fn new(store: Arc<TipStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TipStore {
        &self.store
    }

    pub fn search(&self, query: &str) -> Vec<&Tip> {
        let lowered = query.to_lowercase();
        let words: HashSet<&str> = lowered.split_whitespace().collect();

        let matches: Vec<&Tip> = self
            .store
            .tips()
            .iter()
            .filter(|tip| {
                let content = tip.content.to_lowercase();
                words.iter().any(|word| content.contains(word))
            })
            .collect();

        if matches.is_empty() {
            tracing::debug!(query, "no keyword overlap; returning all tips");
            self.store.tips().iter().collect()
        } else {
            matches
        }
    }

    /// Newline-joined `Source: X => content` lines for the matching tips.
    pub fn render(&self, query: &str) -> String {
        let tips: Vec<Tip> = self.search(query).into_iter().cloned().collect();
        render_tips(&tips)
    }
}

#[async_trait]
impl Retriever for KeywordRetriever {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<Tip>> {
        Ok(self.search(query).into_iter().cloned().collect())
    }
}
